//! The pull-driven interpreter core.
//!
//! The machine is deliberately free of any input source: it reports
//! [`Event::NeedInput`] when it cannot make progress, and the driver (the
//! iterator in this module's sibling, or the `futures` adapters) feeds it a
//! chunk or signals end-of-input. That makes "pull next chunk" the only
//! suspension point, whatever the runtime.

use std::collections::VecDeque;
use std::mem;

use super::{Step, StreamDecoder, Thunk};
use crate::decode::RunDecode;
use crate::{BitBuffer, CodecError, Error};

/// What the machine did on one turn of its crank.
pub(crate) enum Event<A> {
    /// A value was decoded.
    Value(A),
    /// No progress is possible until a chunk is fed or end-of-input is
    /// signalled.
    NeedInput,
    /// Interpretation finished; the outcome records whether input remains.
    Done,
    /// Interpretation failed; no further events follow.
    Failed(Error),
}

/// Whether an interpretation step left unconsumed input behind.
///
/// `Consumed` means the input was taken in full, including a clean
/// end-of-input at an element boundary; it short-circuits any decoders
/// appended after the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Consumed,
    Remainder,
}

/// Live state of a `Decode` step.
struct DecodeState<A> {
    run: RunDecode<A>,
    once: bool,
    fail_on_err: bool,
    fail_on_premature_end: bool,
    /// Bits read from input but not yet consumed by a successful decode.
    carry: BitBuffer,
    /// Most recent insufficient-bits error, kept for reporting.
    carry_err: Option<CodecError>,
}

/// Accumulates an isolate window before the inner decoder runs.
struct IsolateState<A> {
    bit_limit: u64,
    inner: StreamDecoder<A>,
    carry: BitBuffer,
}

/// Work suspended behind the currently executing step.
enum Frame<A> {
    /// Lazily-built second operand of an append.
    Then(Thunk<A>),
    /// Resume a repeating decode after its per-value continuation finishes.
    Loop(DecodeState<A>),
    /// Leave an isolate window: discard its leftovers and restore the outer
    /// input.
    Restore {
        pending: VecDeque<BitBuffer>,
        ended: bool,
    },
}

enum Exec<A> {
    Step(StreamDecoder<A>),
    Decoding(DecodeState<A>),
    Filling(IsolateState<A>),
    Finished(Outcome),
    Failed,
}

/// Interpreter state for one interpretation of one decoder.
///
/// All buffering lives here, never on the decoder value itself, so the same
/// decoder can be interpreted many times over independently.
pub(crate) struct Machine<A> {
    exec: Exec<A>,
    frames: Vec<Frame<A>>,
    /// Chunks available to read: pushed-back remainders first, then whatever
    /// the driver has fed. Push-front keeps remainder reinjection O(1).
    pending: VecDeque<BitBuffer>,
    ended: bool,
}

impl<A> Machine<A> {
    pub(crate) fn new(decoder: StreamDecoder<A>) -> Self {
        Self {
            exec: Exec::Step(decoder),
            frames: Vec::new(),
            pending: VecDeque::new(),
            ended: false,
        }
    }

    /// Hand the machine one more input chunk.
    pub(crate) fn feed(&mut self, chunk: BitBuffer) {
        self.pending.push_back(chunk);
    }

    /// Signal that no further chunks will arrive.
    pub(crate) fn end_of_input(&mut self) {
        self.ended = true;
    }

    /// Final outcome, once interpretation has finished cleanly.
    pub(crate) fn outcome(&self) -> Option<Outcome> {
        match self.exec {
            Exec::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Unread chunks still held by the machine.
    pub(crate) fn take_pending(&mut self) -> VecDeque<BitBuffer> {
        mem::take(&mut self.pending)
    }

    /// Crank the machine until it emits a value, needs input, finishes, or
    /// fails.
    pub(crate) fn next_event(&mut self) -> Event<A> {
        loop {
            match mem::replace(&mut self.exec, Exec::Failed) {
                Exec::Step(decoder) => match decoder.into_step() {
                    Step::Empty => self.complete(Outcome::Remainder),
                    Step::Result(value) => {
                        self.complete(Outcome::Remainder);
                        return Event::Value(value);
                    }
                    Step::Failed(cause) => {
                        return Event::Failed(Error::Decode(cause));
                    }
                    Step::Decode {
                        run,
                        once,
                        fail_on_err,
                        fail_on_premature_end,
                    } => {
                        self.exec = Exec::Decoding(DecodeState {
                            run,
                            once,
                            fail_on_err,
                            fail_on_premature_end,
                            carry: BitBuffer::new(),
                            carry_err: None,
                        });
                    }
                    Step::Isolate { bit_limit, inner } => {
                        self.exec = Exec::Filling(IsolateState {
                            bit_limit,
                            inner: *inner,
                            carry: BitBuffer::new(),
                        });
                    }
                    Step::Append { first, second } => {
                        self.frames.push(Frame::Then(second));
                        self.exec = Exec::Step(*first);
                    }
                },

                Exec::Decoding(state) => {
                    if let Some(event) = self.run_decode(state) {
                        return event;
                    }
                }

                Exec::Filling(state) => {
                    if let Some(event) = self.fill_isolate(state) {
                        return event;
                    }
                }

                Exec::Finished(outcome) => {
                    self.exec = Exec::Finished(outcome);
                    return Event::Done;
                }

                Exec::Failed => {
                    return Event::Done;
                }
            }
        }
    }

    /// Core carry-buffer loop of a `Decode` step.
    ///
    /// Returns `Some` to surface an event to the driver, `None` to let the
    /// main loop continue with whatever `self.exec` now holds.
    fn run_decode(&mut self, mut state: DecodeState<A>) -> Option<Event<A>> {
        loop {
            let chunk = match self.pending.pop_front() {
                Some(chunk) => chunk,
                None if !self.ended => {
                    self.exec = Exec::Decoding(state);
                    return Some(Event::NeedInput);
                }
                None => {
                    // Input exhausted. An empty carry is a clean end at an
                    // element boundary; a non-empty one is mid-element.
                    if state.carry.is_empty() {
                        self.complete(Outcome::Consumed);
                        return None;
                    }
                    if state.fail_on_premature_end {
                        return Some(Event::Failed(Error::PrematureEnd {
                            cause: state.carry_err.take(),
                        }));
                    }
                    let carry = mem::take(&mut state.carry);
                    self.pending.push_front(carry);
                    self.complete(Outcome::Remainder);
                    return None;
                }
            };

            let buffer = if state.carry.is_empty() {
                chunk
            } else {
                let mut buffer = mem::take(&mut state.carry);
                buffer.extend_from_bitslice(&chunk);
                buffer
            };

            match (state.run)(&buffer) {
                Ok((next, remainder)) => {
                    if !remainder.is_empty() {
                        self.pending.push_front(remainder);
                    }
                    if !state.once {
                        state.carry_err = None;
                        self.frames.push(Frame::Loop(state));
                    }
                    self.exec = Exec::Step(next);
                    return None;
                }
                Err(err) if err.is_insufficient_bits() => {
                    // Not enough data yet: buffer everything read so far and
                    // wait for the next chunk.
                    state.carry = buffer;
                    state.carry_err = Some(err);
                }
                Err(err) => {
                    if state.fail_on_err {
                        return Some(Event::Failed(Error::Decode(err)));
                    }
                    // Try variant: stop cleanly, bits stay unconsumed.
                    self.pending.push_front(buffer);
                    self.complete(Outcome::Remainder);
                    return None;
                }
            }
        }
    }

    /// Accumulate an isolate window, then run the inner decoder against the
    /// window alone.
    fn fill_isolate(&mut self, mut state: IsolateState<A>) -> Option<Event<A>> {
        loop {
            if state.carry.len() as u64 >= state.bit_limit {
                let mut window = mem::take(&mut state.carry);
                let overflow = window.split_off(state.bit_limit as usize);
                if !overflow.is_empty() {
                    self.pending.push_front(overflow);
                }
                self.frames.push(Frame::Restore {
                    pending: mem::take(&mut self.pending),
                    ended: self.ended,
                });
                self.pending.push_back(window);
                self.ended = true;
                self.exec = Exec::Step(state.inner);
                return None;
            }

            match self.pending.pop_front() {
                Some(chunk) => state.carry.extend_from_bitslice(&chunk),
                None if !self.ended => {
                    self.exec = Exec::Filling(state);
                    return Some(Event::NeedInput);
                }
                None => {
                    // Input ended before the window filled: hand back the
                    // partial carry without running the inner decoder.
                    if state.carry.is_empty() {
                        self.complete(Outcome::Consumed);
                    } else {
                        let carry = mem::take(&mut state.carry);
                        self.pending.push_front(carry);
                        self.complete(Outcome::Remainder);
                    }
                    return None;
                }
            }
        }
    }

    /// Finish the current step with `outcome` and resume suspended work.
    ///
    /// A `Consumed` outcome drops appended continuations and repeat loops,
    /// since nothing is left for them to read, until an isolate boundary
    /// restores outer input.
    fn complete(&mut self, mut outcome: Outcome) {
        loop {
            match self.frames.pop() {
                None => {
                    self.exec = Exec::Finished(outcome);
                    return;
                }
                Some(Frame::Then(next)) => {
                    if outcome == Outcome::Remainder {
                        self.exec = Exec::Step(next());
                        return;
                    }
                }
                Some(Frame::Loop(mut state)) => {
                    if outcome == Outcome::Remainder {
                        state.carry.clear();
                        state.carry_err = None;
                        self.exec = Exec::Decoding(state);
                        return;
                    }
                }
                Some(Frame::Restore { pending, ended }) => {
                    // Whatever is left of the window is discarded here.
                    self.pending = pending;
                    self.ended = ended;
                    outcome = Outcome::Remainder;
                }
            }
        }
    }
}
