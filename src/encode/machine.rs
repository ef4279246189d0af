//! Interpreter core for the encode side, mirroring the decode machine: the
//! driver feeds values in response to [`Event::NeedValue`] and collects bit
//! chunks.

use std::mem;

use super::{RunEncode, Step, StreamEncoder, Thunk};
use crate::decode::machine::Outcome;
use crate::{BitBuffer, Error};

pub(crate) enum Event {
    /// An encoded chunk (or fixed emission) was produced.
    Bits(BitBuffer),
    /// A value must be fed (or end-of-input signalled) before progress.
    NeedValue,
    /// Interpretation finished.
    Done,
    /// Interpretation failed; no further events follow.
    Failed(Error),
}

struct EncodeState<A> {
    run: RunEncode<A>,
    once: bool,
    fail_on_err: bool,
}

enum Exec<A> {
    Step(StreamEncoder<A>),
    Encoding(EncodeState<A>),
    Finished(Outcome),
    Failed,
}

pub(crate) struct Machine<A> {
    exec: Exec<A>,
    frames: Vec<Thunk<A>>,
    /// One-slot lookahead: the value fed by the driver, doubling as the
    /// push-back slot for a failed `try_once`.
    pushed: Option<A>,
    ended: bool,
}

impl<A> Machine<A> {
    pub(crate) fn new(encoder: StreamEncoder<A>) -> Self {
        Self {
            exec: Exec::Step(encoder),
            frames: Vec::new(),
            pushed: None,
            ended: false,
        }
    }

    pub(crate) fn feed(&mut self, value: A) {
        debug_assert!(self.pushed.is_none());
        self.pushed = Some(value);
    }

    pub(crate) fn end_of_input(&mut self) {
        self.ended = true;
    }

    pub(crate) fn outcome(&self) -> Option<Outcome> {
        match self.exec {
            Exec::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// The unconsumed pushed-back value, if any.
    pub(crate) fn take_pushed(&mut self) -> Option<A> {
        self.pushed.take()
    }

    pub(crate) fn next_event(&mut self) -> Event {
        loop {
            match mem::replace(&mut self.exec, Exec::Failed) {
                Exec::Step(encoder) => match encoder.into_step() {
                    Step::Empty => self.complete(Outcome::Remainder),
                    Step::Emit(bits) => {
                        self.complete(Outcome::Remainder);
                        return Event::Bits(bits);
                    }
                    Step::Encode {
                        run,
                        once,
                        fail_on_err,
                    } => {
                        self.exec = Exec::Encoding(EncodeState {
                            run,
                            once,
                            fail_on_err,
                        });
                    }
                    Step::Append { first, second } => {
                        self.frames.push(second);
                        self.exec = Exec::Step(*first);
                    }
                },

                Exec::Encoding(state) => {
                    let value = match self.pushed.take() {
                        Some(value) => value,
                        None if !self.ended => {
                            self.exec = Exec::Encoding(state);
                            return Event::NeedValue;
                        }
                        None => {
                            self.complete(Outcome::Consumed);
                            continue;
                        }
                    };
                    match (state.run)(&value) {
                        Ok(bits) => {
                            if state.once {
                                self.complete(Outcome::Remainder);
                            } else {
                                self.exec = Exec::Encoding(state);
                            }
                            return Event::Bits(bits);
                        }
                        Err(err) => {
                            if state.fail_on_err {
                                return Event::Failed(Error::Encode(err));
                            }
                            // Try variant: nothing emitted, value handed
                            // back untouched.
                            self.pushed = Some(value);
                            self.complete(Outcome::Remainder);
                        }
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

    fn complete(&mut self, outcome: Outcome) {
        loop {
            match self.frames.pop() {
                None => {
                    self.exec = Exec::Finished(outcome);
                    return;
                }
                Some(next) => {
                    if outcome == Outcome::Remainder {
                        self.exec = Exec::Step(next());
                        return;
                    }
                }
            }
        }
    }
}
