//! Adapters driving the interpreters from [`futures_core::Stream`] sources.
//!
//! These are thin wrappers over the same machines the iterator interface
//! uses: the only await point is the pull of the next chunk (or value), so
//! backpressure and cancellation behave exactly as in the synchronous
//! interface.

use core::pin::Pin;
use core::task::{ready, Context, Poll};

use futures_core::Stream;
use pin_project_lite::pin_project;

use crate::decode::machine as decode_machine;
use crate::encode::machine as encode_machine;
use crate::{BitBuffer, Error, StreamDecoder, StreamEncoder};

impl<A> StreamDecoder<A> {
    /// Interpret this decoder against a stream of bit chunks.
    pub fn decode_stream<S>(self, chunks: S) -> DecoderStream<S, A>
    where
        S: Stream<Item = BitBuffer>,
    {
        DecoderStream {
            chunks,
            machine: decode_machine::Machine::new(self),
            done: false,
        }
    }
}

impl<A> StreamEncoder<A> {
    /// Interpret this encoder against a stream of values.
    pub fn encode_stream<S>(self, values: S) -> EncoderStream<S, A>
    where
        S: Stream<Item = A>,
    {
        EncoderStream {
            values,
            machine: encode_machine::Machine::new(self),
            done: false,
        }
    }
}

pin_project! {
    /// Stream of decoded values, produced by
    /// [`StreamDecoder::decode_stream`].
    pub struct DecoderStream<S, A> {
        #[pin]
        chunks: S,
        machine: decode_machine::Machine<A>,
        done: bool,
    }
}

impl<S, A> Stream for DecoderStream<S, A>
where
    S: Stream<Item = BitBuffer>,
{
    type Item = Result<A, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        loop {
            match this.machine.next_event() {
                decode_machine::Event::Value(value) => return Poll::Ready(Some(Ok(value))),
                decode_machine::Event::NeedInput => {
                    match ready!(this.chunks.as_mut().poll_next(cx)) {
                        Some(chunk) => this.machine.feed(chunk),
                        None => this.machine.end_of_input(),
                    }
                }
                decode_machine::Event::Done => {
                    *this.done = true;
                    return Poll::Ready(None);
                }
                decode_machine::Event::Failed(err) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(err)));
                }
            }
        }
    }
}

pin_project! {
    /// Stream of encoded bit chunks, produced by
    /// [`StreamEncoder::encode_stream`].
    pub struct EncoderStream<S, A> {
        #[pin]
        values: S,
        machine: encode_machine::Machine<A>,
        done: bool,
    }
}

impl<S, A> Stream for EncoderStream<S, A>
where
    S: Stream<Item = A>,
{
    type Item = Result<BitBuffer, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        loop {
            match this.machine.next_event() {
                encode_machine::Event::Bits(bits) => return Poll::Ready(Some(Ok(bits))),
                encode_machine::Event::NeedValue => {
                    match ready!(this.values.as_mut().poll_next(cx)) {
                        Some(value) => this.machine.feed(value),
                        None => this.machine.end_of_input(),
                    }
                }
                encode_machine::Event::Done => {
                    *this.done = true;
                    return Poll::Ready(None);
                }
                encode_machine::Event::Failed(err) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(err)));
                }
            }
        }
    }
}
