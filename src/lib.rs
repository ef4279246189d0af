//! Combinators for incrementally decoding a stream of binary data into a
//! stream of values, and for encoding a stream of values into binary chunks,
//! without buffering whole messages.
//!
//! An ordinary one-shot codec forces an entire logical unit (say, a whole
//! encoded vector) to be buffered before any element of it is usable. The
//! combinators in this crate instead drive a caller-supplied value codec
//! against bit chunks as they arrive: decode one value, hand it downstream,
//! and keep decoding from whatever bits remain: carrying partial elements
//! across chunk boundaries, splicing leftovers back into the input, and
//! distinguishing "not enough bits yet" from "corrupt data" from "clean end
//! of stream".
//!
//! # Decoding
//!
//! A [`StreamDecoder`] is built declaratively from combinators and only does
//! work when interpreted against an input:
//!
//! * [`StreamDecoder::once`] decodes exactly one value, waiting for more
//!   input when bits are short.
//! * [`StreamDecoder::many`] repeats until the input is exhausted.
//! * [`StreamDecoder::once_complete`] / [`StreamDecoder::many_complete`]
//!   additionally fail if the input ends in the middle of an element.
//! * [`StreamDecoder::try_once`] / [`StreamDecoder::try_many`] treat a
//!   genuine decode error as a clean stop instead of a failure, leaving the
//!   offending bits unconsumed.
//! * [`StreamDecoder::isolate`] hard-limits a decoder to a fixed-size bit
//!   window, discarding whatever it leaves unread inside the window.
//! * [`StreamDecoder::then`] sequences two decoders, constructing the second
//!   lazily so decoders may be defined recursively.
//!
//! Interpretation is pull-based: [`StreamDecoder::decode`] turns any iterator
//! of [`BitBuffer`] chunks into an iterator of decoded values, pulling one
//! chunk at a time, only when needed. After the output is drained,
//! [`DecodeIter::into_remainder`] hands back whatever input was not consumed.
//!
//! ```
//! use bitpipe::{BitBuffer, BitSlice, CodecError, Decode, Decoded, StreamDecoder};
//! use bitvec::field::BitField;
//!
//! /// Fixed-width big-endian byte codec.
//! struct Byte;
//!
//! impl Decode for Byte {
//!     type Item = u8;
//!
//!     fn decode(&self, bits: &BitSlice) -> Result<Decoded<u8>, CodecError> {
//!         if bits.len() < 8 {
//!             return Err(CodecError::insufficient_bits(8, bits.len() as u64));
//!         }
//!         Ok(Decoded { value: bits[..8].load_be(), consumed: 8 })
//!     }
//! }
//!
//! let mut bits = BitBuffer::new();
//! for byte in [0xDEu8, 0xAD, 0xBE, 0xEF] {
//!     let mut cell = BitBuffer::repeat(false, 8);
//!     cell.store_be(byte);
//!     bits.extend_from_bitslice(&cell);
//! }
//!
//! // Chunk boundaries are arbitrary: split mid-element and decode anyway.
//! let chunks = [bits[..13].to_bitvec(), bits[13..20].to_bitvec(), bits[20..].to_bitvec()];
//! let decoded: Result<Vec<u8>, _> = StreamDecoder::many(Byte).decode(chunks).collect();
//! assert_eq!(decoded.unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
//! ```
//!
//! # Encoding
//!
//! [`StreamEncoder`] is the much simpler dual: it turns a stream of values
//! into a stream of bit chunks, one chunk per encoded value, short-circuiting
//! on failure. [`StreamEncoder::emit`] prepends fixed bits (e.g. a header),
//! [`StreamEncoder::try_once`] skips a failing encoder without consuming the
//! value, and [`StreamEncoder::encode_all_valid`] collects everything into
//! one buffer for trusted input.
//!
//! # Errors
//!
//! Value codecs report [`CodecError::InsufficientBits`] when they need more
//! input; every other failure is a genuine decode error. The distinction is
//! load-bearing: insufficient bits make the interpreter buffer and wait,
//! while genuine errors either fail the whole output sequence
//! ([`Error::Decode`]) or, under a `try_*` variant, end it silently.
//! Consumers observe failure as the output iterator yielding a final `Err`;
//! there is no per-element error recovery.
//!
//! # Feature flags
//!
//! * `futures`: adapters driving the same interpreters from
//!   `futures_core::Stream` sources, for use inside async pipelines.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod codec;
mod error;

pub mod decode;
pub mod encode;

#[cfg(feature = "futures")]
#[cfg_attr(docsrs, doc(cfg(feature = "futures")))]
pub mod futures;

pub use crate::codec::{Decode, Decoded, Encode};
pub use crate::decode::{DecodeIter, Remainder, StreamDecoder};
pub use crate::encode::{EncodeIter, StreamEncoder, ValueRemainder};
pub use crate::error::{CodecError, Error};

/// Owned buffer of bits, the unit of chunked input and output.
///
/// `Msb0` ordering is relied upon throughout: bit 0 of a buffer is the most
/// significant bit of its first byte, i.e. wire order.
pub type BitBuffer = bitvec::vec::BitVec<u8, bitvec::order::Msb0>;

/// Borrowed view of a [`BitBuffer`].
pub type BitSlice = bitvec::slice::BitSlice<u8, bitvec::order::Msb0>;
