//! Incremental encoding: the [`StreamEncoder`] algebra and its interpreter.
//!
//! The encode side is much simpler than decoding: there is no carry
//! buffering, since an encode failure is never about insufficient input.

mod iter;
pub(crate) mod machine;

use std::fmt;
use std::sync::Arc;

use crate::{BitBuffer, CodecError, Encode};

pub use self::iter::{EncodeIter, ValueRemainder};

pub(crate) type Thunk<A> = Arc<dyn Fn() -> StreamEncoder<A> + Send + Sync>;
pub(crate) type RunEncode<A> = Arc<dyn Fn(&A) -> Result<BitBuffer, CodecError> + Send + Sync>;

/// A declarative description of an incremental encode.
///
/// Interpreted against a stream of values with
/// [`encode`](StreamEncoder::encode), producing one bit chunk per encoded
/// value. Like its decoding counterpart, an encoder value is immutable and
/// reusable across any number of interpretations.
pub struct StreamEncoder<A> {
    step: Step<A>,
}

pub(crate) enum Step<A> {
    /// Terminal, emits nothing, reads nothing.
    Empty,
    /// Emits fixed bits exactly once, ignoring the input values.
    Emit(BitBuffer),
    /// Encodes one (or every) incoming value.
    Encode {
        run: RunEncode<A>,
        once: bool,
        fail_on_err: bool,
    },
    /// Runs `first` over the input to completion, then `second()` over what
    /// remains.
    Append {
        first: Box<StreamEncoder<A>>,
        second: Thunk<A>,
    },
}

impl<A> StreamEncoder<A> {
    pub(crate) fn from_step(step: Step<A>) -> Self {
        Self { step }
    }

    pub(crate) fn into_step(self) -> Step<A> {
        self.step
    }

    /// Interpret this encoder against an iterator of values.
    ///
    /// The returned iterator yields one bit chunk per encoded value (plus
    /// any fixed emissions); an encode failure is yielded once as a final
    /// `Err`.
    pub fn encode<I>(self, values: I) -> EncodeIter<A, I::IntoIter>
    where
        I: IntoIterator<Item = A>,
    {
        EncodeIter::new(machine::Machine::new(self), values.into_iter())
    }

    /// Encode a full sequence of trusted values into one buffer.
    ///
    /// # Panics
    ///
    /// Panics if any encode step fails. Intended for trusted or test input
    /// where a failure is a bug, not a condition to recover from.
    pub fn encode_all_valid<I>(self, values: I) -> BitBuffer
    where
        I: IntoIterator<Item = A>,
    {
        let mut bits = BitBuffer::new();
        for chunk in self.encode(values) {
            match chunk {
                Ok(chunk) => bits.extend_from_bitslice(&chunk),
                Err(err) => panic!("encoding failed: {err}"),
            }
        }
        bits
    }
}

impl<A: Send + Sync + 'static> StreamEncoder<A> {
    /// An encoder that emits nothing and reads nothing.
    pub fn empty() -> Self {
        Self::from_step(Step::Empty)
    }

    /// Emit `bits` exactly once, regardless of the input values, typically
    /// a fixed header in front of a repeating body.
    pub fn emit(bits: BitBuffer) -> Self {
        Self::from_step(Step::Emit(bits))
    }

    /// Encode exactly one value; an encode failure fails the interpretation.
    pub fn once<C>(codec: C) -> Self
    where
        C: Encode<Item = A> + Send + Sync + 'static,
    {
        Self::from_codec(codec, true, true)
    }

    /// Encode every incoming value; an encode failure fails the
    /// interpretation.
    pub fn many<C>(codec: C) -> Self
    where
        C: Encode<Item = A> + Send + Sync + 'static,
    {
        Self::from_codec(codec, false, true)
    }

    /// Attempt to encode one value; on failure, emit nothing and stop
    /// without error, leaving the value unconsumed for whatever runs next.
    pub fn try_once<C>(codec: C) -> Self
    where
        C: Encode<Item = A> + Send + Sync + 'static,
    {
        Self::from_codec(codec, true, false)
    }

    fn from_codec<C>(codec: C, once: bool, fail_on_err: bool) -> Self
    where
        C: Encode<Item = A> + Send + Sync + 'static,
    {
        let run: RunEncode<A> = Arc::new(move |value| codec.encode(value));
        Self::from_step(Step::Encode {
            run,
            once,
            fail_on_err,
        })
    }

    /// Run this encoder over the input to completion, then run `next()` over
    /// the values that remain. When this encoder consumes the input fully,
    /// `next` never runs.
    pub fn then<F>(self, next: F) -> Self
    where
        F: Fn() -> StreamEncoder<A> + Send + Sync + 'static,
    {
        Self::from_step(Step::Append {
            first: Box::new(self),
            second: Arc::new(next),
        })
    }
}

impl<A> Clone for StreamEncoder<A> {
    fn clone(&self) -> Self {
        let step = match &self.step {
            Step::Empty => Step::Empty,
            Step::Emit(bits) => Step::Emit(bits.clone()),
            Step::Encode {
                run,
                once,
                fail_on_err,
            } => Step::Encode {
                run: Arc::clone(run),
                once: *once,
                fail_on_err: *fail_on_err,
            },
            Step::Append { first, second } => Step::Append {
                first: first.clone(),
                second: Arc::clone(second),
            },
        };
        Self { step }
    }
}

impl<A> fmt::Debug for StreamEncoder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.step {
            Step::Empty => f.write_str("StreamEncoder::Empty"),
            Step::Emit(bits) => f
                .debug_struct("StreamEncoder::Emit")
                .field("bits", &bits.len())
                .finish(),
            Step::Encode {
                once, fail_on_err, ..
            } => f
                .debug_struct("StreamEncoder::Encode")
                .field("once", once)
                .field("fail_on_err", fail_on_err)
                .finish_non_exhaustive(),
            Step::Append { first, .. } => f
                .debug_struct("StreamEncoder::Append")
                .field("first", first)
                .finish_non_exhaustive(),
        }
    }
}
