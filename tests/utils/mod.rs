#![allow(unused)] // Different tests use a different subset of functions

use bitpipe::{BitBuffer, BitSlice, CodecError, Decode, Decoded, Encode, StreamEncoder};
use bitvec::field::BitField;

/// Fixed-width big-endian `u32` codec.
#[derive(Debug, Clone, Copy)]
pub struct U32Be;

impl Decode for U32Be {
    type Item = u32;

    fn decode(&self, bits: &BitSlice) -> Result<Decoded<u32>, CodecError> {
        if bits.len() < 32 {
            return Err(CodecError::insufficient_bits(32, bits.len() as u64));
        }
        Ok(Decoded {
            value: bits[..32].load_be(),
            consumed: 32,
        })
    }
}

impl Encode for U32Be {
    type Item = u32;

    fn encode(&self, item: &u32) -> Result<BitBuffer, CodecError> {
        let mut bits = BitBuffer::repeat(false, 32);
        bits.as_mut_bitslice().store_be(*item);
        Ok(bits)
    }
}

/// Value whose appearance on the wire [`CheckedU32`] treats as corrupt data.
pub const SENTINEL: u32 = 0xDEAD_BEEF;

/// Like [`U32Be`], but decoding [`SENTINEL`] is a genuine decode error, the
/// stand-in for trailing garbage in a stream.
#[derive(Debug, Clone, Copy)]
pub struct CheckedU32;

impl Decode for CheckedU32 {
    type Item = u32;

    fn decode(&self, bits: &BitSlice) -> Result<Decoded<u32>, CodecError> {
        let decoded = U32Be.decode(bits)?;
        if decoded.value == SENTINEL {
            return Err(CodecError::message("bad magic"));
        }
        Ok(decoded)
    }
}

impl Encode for CheckedU32 {
    type Item = u32;

    fn encode(&self, item: &u32) -> Result<BitBuffer, CodecError> {
        U32Be.encode(item)
    }
}

/// Length-prefixed UTF-8 string codec: one byte of byte count, then the
/// bytes.
#[derive(Debug, Clone, Copy)]
pub struct Utf8Str;

impl Decode for Utf8Str {
    type Item = String;

    fn decode(&self, bits: &BitSlice) -> Result<Decoded<String>, CodecError> {
        if bits.len() < 8 {
            return Err(CodecError::insufficient_bits(8, bits.len() as u64));
        }
        let len = bits[..8].load_be::<u8>() as usize;
        let needed = 8 + len * 8;
        if bits.len() < needed {
            return Err(CodecError::insufficient_bits(needed as u64, bits.len() as u64));
        }
        let bytes: Vec<u8> = (0..len)
            .map(|i| bits[8 + i * 8..16 + i * 8].load_be())
            .collect();
        let value = String::from_utf8(bytes)
            .map_err(|err| CodecError::message(format!("invalid utf-8: {err}")))?;
        Ok(Decoded {
            value,
            consumed: needed,
        })
    }
}

impl Encode for Utf8Str {
    type Item = String;

    fn encode(&self, item: &String) -> Result<BitBuffer, CodecError> {
        let bytes = item.as_bytes();
        if bytes.len() > u8::MAX as usize {
            return Err(CodecError::message("string too long for length prefix"));
        }
        let mut bits = byte_bits(bytes.len() as u8);
        for &byte in bytes {
            bits.extend_from_bitslice(&byte_bits(byte));
        }
        Ok(bits)
    }
}

/// Encoder that refuses every value.
#[derive(Debug, Clone, Copy)]
pub struct FailingEncoder;

impl Encode for FailingEncoder {
    type Item = u32;

    fn encode(&self, _item: &u32) -> Result<BitBuffer, CodecError> {
        Err(CodecError::message("refused"))
    }
}

/// One byte as a bit buffer.
pub fn byte_bits(byte: u8) -> BitBuffer {
    let mut bits = BitBuffer::repeat(false, 8);
    bits.as_mut_bitslice().store_be(byte);
    bits
}

/// The big-endian encoding of `values`, concatenated.
pub fn u32_bits(values: &[u32]) -> BitBuffer {
    StreamEncoder::many(U32Be).encode_all_valid(values.to_vec())
}

/// Split `bits` into chunks of `size` bits; the last chunk may be shorter.
pub fn chunks_of(bits: &BitSlice, size: usize) -> Vec<BitBuffer> {
    bits.chunks(size).map(|chunk| chunk.to_bitvec()).collect()
}

/// Split `bits` at irregular points, cycling through `sizes`, with an empty
/// chunk interleaved before each piece to exercise empty-chunk handling.
pub fn rechunk(bits: &BitSlice, sizes: &[usize]) -> Vec<BitBuffer> {
    let mut chunks = Vec::new();
    let mut rest = bits;
    let mut i = 0;
    while !rest.is_empty() {
        let take = sizes[i % sizes.len()].min(rest.len());
        chunks.push(BitBuffer::new());
        chunks.push(rest[..take].to_bitvec());
        rest = &rest[take..];
        i += 1;
    }
    chunks.push(BitBuffer::new());
    chunks
}
