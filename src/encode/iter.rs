use std::iter::Fuse;

use super::machine::{Event, Machine};
use crate::decode::machine::Outcome;
use crate::{BitBuffer, Error};

/// Iterator interpreting a [`StreamEncoder`](super::StreamEncoder) against a
/// value source, yielding encoded bit chunks.
pub struct EncodeIter<A, I: Iterator> {
    machine: Machine<A>,
    source: Fuse<I>,
    done: bool,
}

impl<A, I> EncodeIter<A, I>
where
    I: Iterator<Item = A>,
{
    pub(crate) fn new(machine: Machine<A>, source: I) -> Self {
        Self {
            machine,
            source: source.fuse(),
            done: false,
        }
    }

    /// The values left unconsumed, available once the output is drained.
    ///
    /// Returns `None` when the input was consumed in full. A value pushed
    /// back by a failed [`try_once`](super::StreamEncoder::try_once) appears
    /// first, followed by the untouched tail of the source.
    pub fn into_remainder(mut self) -> Option<ValueRemainder<A, I>> {
        match self.machine.outcome() {
            Some(Outcome::Remainder) => Some(ValueRemainder {
                pushed: self.machine.take_pushed(),
                rest: self.source,
            }),
            _ => None,
        }
    }
}

impl<A, I> Iterator for EncodeIter<A, I>
where
    I: Iterator<Item = A>,
{
    type Item = Result<BitBuffer, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.machine.next_event() {
                Event::Bits(bits) => return Some(Ok(bits)),
                Event::NeedValue => match self.source.next() {
                    Some(value) => self.machine.feed(value),
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

/// Unconsumed values handed back by [`EncodeIter::into_remainder`].
pub struct ValueRemainder<A, I: Iterator> {
    pushed: Option<A>,
    rest: Fuse<I>,
}

impl<A, I> Iterator for ValueRemainder<A, I>
where
    I: Iterator<Item = A>,
{
    type Item = A;

    fn next(&mut self) -> Option<Self::Item> {
        self.pushed.take().or_else(|| self.rest.next())
    }
}
