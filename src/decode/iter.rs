use std::collections::VecDeque;
use std::iter::Fuse;

use super::machine::{Event, Machine, Outcome};
use crate::{BitBuffer, Error};

/// Iterator interpreting a [`StreamDecoder`](super::StreamDecoder) against a
/// chunk source.
///
/// Yields decoded values in input order; a failure is yielded once as a
/// final `Err`, after which the iterator is exhausted. Chunks are pulled
/// from the source one at a time, only when decoding cannot progress
/// otherwise, so an unconsumed output naturally stalls input consumption.
pub struct DecodeIter<A, I: Iterator> {
    machine: Machine<A>,
    source: Fuse<I>,
    done: bool,
}

impl<A, I> DecodeIter<A, I>
where
    I: Iterator<Item = BitBuffer>,
{
    pub(crate) fn new(machine: Machine<A>, source: I) -> Self {
        Self {
            machine,
            source: source.fuse(),
            done: false,
        }
    }

    /// The input left unconsumed, available once the output is drained.
    ///
    /// Returns `None` when the input was consumed in full (or when decoding
    /// failed, or has not yet run to completion). `Some` hands back the
    /// pushed-back bits followed by the untouched tail of the source; note
    /// the contained sequence may itself be empty; "nothing left to read"
    /// and "fully consumed" are reported distinctly on purpose.
    pub fn into_remainder(mut self) -> Option<Remainder<I>> {
        match self.machine.outcome() {
            Some(Outcome::Remainder) => Some(Remainder {
                pending: self.machine.take_pending(),
                rest: self.source,
            }),
            _ => None,
        }
    }
}

impl<A, I> Iterator for DecodeIter<A, I>
where
    I: Iterator<Item = BitBuffer>,
{
    type Item = Result<A, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.machine.next_event() {
                Event::Value(value) => return Some(Ok(value)),
                Event::NeedInput => match self.source.next() {
                    Some(chunk) => self.machine.feed(chunk),
                    None => self.machine.end_of_input(),
                },
                Event::Done => {
                    self.done = true;
                    return None;
                }
                Event::Failed(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Unconsumed input handed back by [`DecodeIter::into_remainder`]: any
/// pushed-back chunks, then the untouched tail of the original source.
pub struct Remainder<I: Iterator> {
    pending: VecDeque<BitBuffer>,
    rest: Fuse<I>,
}

impl<I> Remainder<I>
where
    I: Iterator<Item = BitBuffer>,
{
    /// Concatenate every remaining chunk into one buffer.
    pub fn collect_bits(self) -> BitBuffer {
        let mut bits = BitBuffer::new();
        for chunk in self {
            bits.extend_from_bitslice(&chunk);
        }
        bits
    }
}

impl<I> Iterator for Remainder<I>
where
    I: Iterator<Item = BitBuffer>,
{
    type Item = BitBuffer;

    fn next(&mut self) -> Option<Self::Item> {
        self.pending.pop_front().or_else(|| self.rest.next())
    }
}
