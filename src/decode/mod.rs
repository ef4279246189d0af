//! Incremental decoding: the [`StreamDecoder`] combinator algebra and its
//! pull-based interpreter.

mod iter;
pub(crate) mod machine;

use std::fmt;
use std::sync::Arc;

use crate::{BitBuffer, BitSlice, CodecError, Decode, Error};

pub use self::iter::{DecodeIter, Remainder};

pub(crate) type Thunk<A> = Arc<dyn Fn() -> StreamDecoder<A> + Send + Sync>;

/// One decode attempt: given the buffered bits, either fail or produce a
/// continuation decoder plus the unconsumed remainder. Returning a decoder
/// rather than a bare value is what lets `flat_map` rewrite the per-decode
/// continuation structurally.
pub(crate) type RunDecode<A> =
    Arc<dyn Fn(&BitSlice) -> Result<(StreamDecoder<A>, BitBuffer), CodecError> + Send + Sync>;

/// A declarative description of an incremental decode.
///
/// Values of this type are immutable and side-effect-free to construct; all
/// work happens when one is interpreted against an input with
/// [`decode`](StreamDecoder::decode) or
/// [`decode_all`](StreamDecoder::decode_all). A decoder may be cloned and
/// interpreted any number of times, concurrently included: interpretation
/// never mutates it.
pub struct StreamDecoder<A> {
    step: Step<A>,
}

pub(crate) enum Step<A> {
    /// Terminal, emits nothing.
    Empty,
    /// Terminal, emits exactly one value consuming zero bits.
    Result(A),
    /// Terminal, fails the interpretation when reached.
    Failed(CodecError),
    /// Repeatedly (or once) attempts a decode against accumulating bits.
    Decode {
        run: RunDecode<A>,
        once: bool,
        fail_on_err: bool,
        fail_on_premature_end: bool,
    },
    /// Restricts `inner` to a window of at most `bit_limit` bits, discarding
    /// whatever it leaves unconsumed inside the window.
    Isolate {
        bit_limit: u64,
        inner: Box<StreamDecoder<A>>,
    },
    /// Runs `first` to completion, feeding its unconsumed remainder to
    /// `second()`. The second operand is constructed lazily so decoders can
    /// reference themselves.
    Append {
        first: Box<StreamDecoder<A>>,
        second: Thunk<A>,
    },
}

impl<A> StreamDecoder<A> {
    pub(crate) fn from_step(step: Step<A>) -> Self {
        Self { step }
    }

    pub(crate) fn into_step(self) -> Step<A> {
        self.step
    }

    /// Interpret this decoder against an iterator of bit chunks.
    ///
    /// The returned iterator pulls one chunk at a time, only when the decoder
    /// cannot make progress with what it has already read, and yields values
    /// in strict decode order. A failure is yielded as a final `Err`, after
    /// which the iterator is exhausted.
    pub fn decode<I>(self, chunks: I) -> DecodeIter<A, I::IntoIter>
    where
        I: IntoIterator<Item = BitBuffer>,
    {
        DecodeIter::new(machine::Machine::new(self), chunks.into_iter())
    }

    /// One-shot adapter: decode a whole in-memory buffer.
    ///
    /// Collects every emitted value in emission order and concatenates the
    /// final unconsumed input into a single remainder buffer (empty when the
    /// input was fully consumed).
    pub fn decode_all(self, bits: &BitSlice) -> Result<(Vec<A>, BitBuffer), Error> {
        let mut iter = self.decode([bits.to_bitvec()]);
        let mut values = Vec::new();
        for item in &mut iter {
            values.push(item?);
        }
        let remainder = match iter.into_remainder() {
            Some(rest) => rest.collect_bits(),
            None => BitBuffer::new(),
        };
        Ok((values, remainder))
    }
}

impl<A: Send + Sync + 'static> StreamDecoder<A> {
    /// A decoder that emits nothing and consumes nothing.
    pub fn empty() -> Self {
        Self::from_step(Step::Empty)
    }

    /// Emits exactly `value`, consuming zero bits.
    pub fn emit(value: A) -> Self {
        Self::from_step(Step::Result(value))
    }

    /// Emits every element of `values` in order, consuming zero bits.
    pub fn emits<I>(values: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Clone,
    {
        values.into_iter().fold(Self::empty(), |acc, value| {
            acc.then(move || Self::emit(value.clone()))
        })
    }

    /// Fails the interpretation with `cause` when reached.
    pub fn fail(cause: CodecError) -> Self {
        Self::from_step(Step::Failed(cause))
    }

    /// Decode exactly one value.
    ///
    /// When the buffered input is too short for a whole value the decoder
    /// waits for more chunks rather than failing; a genuine decode error
    /// fails the interpretation.
    pub fn once<C>(codec: C) -> Self
    where
        C: Decode<Item = A> + Send + Sync + 'static,
    {
        Self::from_codec(codec, true, true, false)
    }

    /// Decode values repeatedly until the input is exhausted.
    pub fn many<C>(codec: C) -> Self
    where
        C: Decode<Item = A> + Send + Sync + 'static,
    {
        Self::from_codec(codec, false, true, false)
    }

    /// Like [`once`](Self::once), but fails if the input ends while bits are
    /// still buffered mid-element.
    pub fn once_complete<C>(codec: C) -> Self
    where
        C: Decode<Item = A> + Send + Sync + 'static,
    {
        Self::from_codec(codec, true, true, true)
    }

    /// Like [`many`](Self::many), but fails if the input ends while bits are
    /// still buffered mid-element, as opposed to cleanly at an element
    /// boundary.
    pub fn many_complete<C>(codec: C) -> Self
    where
        C: Decode<Item = A> + Send + Sync + 'static,
    {
        Self::from_codec(codec, false, true, true)
    }

    /// Like [`once`](Self::once), but a genuine decode error stops the
    /// decoder silently, leaving the buffered bits unconsumed.
    pub fn try_once<C>(codec: C) -> Self
    where
        C: Decode<Item = A> + Send + Sync + 'static,
    {
        Self::from_codec(codec, true, false, false)
    }

    /// Like [`many`](Self::many), but a genuine decode error stops the
    /// decoder silently after the values already emitted, leaving the
    /// offending bits unconsumed.
    pub fn try_many<C>(codec: C) -> Self
    where
        C: Decode<Item = A> + Send + Sync + 'static,
    {
        Self::from_codec(codec, false, false, false)
    }

    fn from_codec<C>(codec: C, once: bool, fail_on_err: bool, fail_on_premature_end: bool) -> Self
    where
        C: Decode<Item = A> + Send + Sync + 'static,
    {
        let run: RunDecode<A> = Arc::new(move |bits| {
            let decoded = codec.decode(bits)?;
            Ok((
                StreamDecoder::emit(decoded.value),
                bits[decoded.consumed..].to_bitvec(),
            ))
        });
        Self::from_step(Step::Decode {
            run,
            once,
            fail_on_err,
            fail_on_premature_end,
        })
    }

    /// Decode and discard exactly `bit_count` bits.
    pub fn ignore(bit_count: u64) -> Self {
        let run: RunDecode<A> = Arc::new(move |bits| {
            let available = bits.len() as u64;
            if available < bit_count {
                return Err(CodecError::insufficient_bits(bit_count, available));
            }
            Ok((
                StreamDecoder::empty(),
                bits[bit_count as usize..].to_bitvec(),
            ))
        });
        Self::from_step(Step::Decode {
            run,
            once: true,
            fail_on_err: true,
            fail_on_premature_end: false,
        })
    }

    /// Restrict this decoder to a window of at most `bit_limit` bits.
    ///
    /// The window is accumulated from the input, the decoder runs against it
    /// alone, and anything it leaves unconsumed inside the window is
    /// discarded; input after the window continues with the next decoder.
    /// Should the input end before `bit_limit` bits accumulate, the partial
    /// window is handed back as remainder without running the decoder.
    pub fn isolate(self, bit_limit: u64) -> Self {
        Self::from_step(Step::Isolate {
            bit_limit,
            inner: Box::new(self),
        })
    }

    /// Run this decoder to completion, then run `next()` on its unconsumed
    /// remainder.
    ///
    /// `next` is invoked lazily, each time control actually reaches it, so a
    /// decoder may be defined in terms of itself. When this decoder consumes
    /// the input fully (including a clean end-of-input), `next` never runs.
    pub fn then<F>(self, next: F) -> Self
    where
        F: Fn() -> StreamDecoder<A> + Send + Sync + 'static,
    {
        Self::from_step(Step::Append {
            first: Box::new(self),
            second: Arc::new(next),
        })
    }

    /// Route every decoded value through `f`, splicing the resulting
    /// decoder's output into the stream.
    pub fn flat_map<B, F>(self, f: F) -> StreamDecoder<B>
    where
        B: Send + Sync + 'static,
        F: Fn(A) -> StreamDecoder<B> + Send + Sync + 'static,
    {
        self.flat_map_shared(Arc::new(f))
    }

    /// Transform every decoded value with `f`.
    pub fn map<B, F>(self, f: F) -> StreamDecoder<B>
    where
        B: Send + Sync + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.flat_map(move |value| StreamDecoder::emit(f(value)))
    }

    fn flat_map_shared<B>(self, f: Arc<dyn Fn(A) -> StreamDecoder<B> + Send + Sync>) -> StreamDecoder<B>
    where
        B: Send + Sync + 'static,
    {
        match self.step {
            Step::Empty => StreamDecoder::empty(),
            Step::Result(value) => f(value),
            Step::Failed(cause) => StreamDecoder::fail(cause),
            Step::Decode {
                run,
                once,
                fail_on_err,
                fail_on_premature_end,
            } => {
                let g = Arc::clone(&f);
                let run: RunDecode<B> = Arc::new(move |bits| {
                    let (next, remainder) = run(bits)?;
                    Ok((next.flat_map_shared(Arc::clone(&g)), remainder))
                });
                StreamDecoder::from_step(Step::Decode {
                    run,
                    once,
                    fail_on_err,
                    fail_on_premature_end,
                })
            }
            Step::Isolate { bit_limit, inner } => StreamDecoder::from_step(Step::Isolate {
                bit_limit,
                inner: Box::new(inner.flat_map_shared(f)),
            }),
            Step::Append { first, second } => {
                let g = Arc::clone(&f);
                StreamDecoder::from_step(Step::Append {
                    first: Box::new(first.flat_map_shared(f)),
                    second: Arc::new(move || second().flat_map_shared(Arc::clone(&g))),
                })
            }
        }
    }
}

impl<A: Clone> Clone for StreamDecoder<A> {
    fn clone(&self) -> Self {
        Self {
            step: self.step.clone(),
        }
    }
}

impl<A: Clone> Clone for Step<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Result(value) => Self::Result(value.clone()),
            Self::Failed(cause) => Self::Failed(cause.clone()),
            Self::Decode {
                run,
                once,
                fail_on_err,
                fail_on_premature_end,
            } => Self::Decode {
                run: Arc::clone(run),
                once: *once,
                fail_on_err: *fail_on_err,
                fail_on_premature_end: *fail_on_premature_end,
            },
            Self::Isolate { bit_limit, inner } => Self::Isolate {
                bit_limit: *bit_limit,
                inner: inner.clone(),
            },
            Self::Append { first, second } => Self::Append {
                first: first.clone(),
                second: Arc::clone(second),
            },
        }
    }
}

impl<A> fmt::Debug for StreamDecoder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.step {
            Step::Empty => f.write_str("StreamDecoder::Empty"),
            Step::Result(_) => f.write_str("StreamDecoder::Result"),
            Step::Failed(cause) => f.debug_tuple("StreamDecoder::Failed").field(cause).finish(),
            Step::Decode {
                once,
                fail_on_err,
                fail_on_premature_end,
                ..
            } => f
                .debug_struct("StreamDecoder::Decode")
                .field("once", once)
                .field("fail_on_err", fail_on_err)
                .field("fail_on_premature_end", fail_on_premature_end)
                .finish_non_exhaustive(),
            Step::Isolate { bit_limit, inner } => f
                .debug_struct("StreamDecoder::Isolate")
                .field("bit_limit", bit_limit)
                .field("inner", inner)
                .finish(),
            Step::Append { first, .. } => f
                .debug_struct("StreamDecoder::Append")
                .field("first", first)
                .finish_non_exhaustive(),
        }
    }
}
