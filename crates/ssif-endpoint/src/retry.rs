use std::time::Duration;

use ssif_bus::Stall;

/// Outcome of one attempt handed to [`Retry::run`].
#[derive(Debug)]
pub enum Attempt<T, R, E> {
    /// Finished; stop with this value.
    Done(T),
    /// Not yet; try again if the budget allows.
    Retry(R),
    /// Give up immediately.
    Abort(E),
}

/// Why [`Retry::run`] gave up.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryError<R, E> {
    /// An attempt returned [`Attempt::Abort`].
    Aborted(E),
    /// Every attempt returned [`Attempt::Retry`]; `last` is the final one.
    Exhausted { attempts: u32, last: R },
}

/// Bounded retry: at most `attempts` tries with a fixed stall between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    attempts: u32,
    delay: Duration,
}

impl Retry {
    /// A budget of zero attempts still runs once.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `op` until it finishes, aborts, or the budget is spent.
    ///
    /// `op` receives the zero-based attempt number. The stall happens only
    /// between attempts, never after the last one.
    pub fn run<T, R, E, S, F>(&self, stall: &mut S, mut op: F) -> Result<T, RetryError<R, E>>
    where
        S: Stall + ?Sized,
        F: FnMut(u32) -> Attempt<T, R, E>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt) {
                Attempt::Done(value) => return Ok(value),
                Attempt::Abort(err) => return Err(RetryError::Aborted(err)),
                Attempt::Retry(last) => {
                    attempt += 1;
                    if attempt >= self.attempts {
                        return Err(RetryError::Exhausted {
                            attempts: attempt,
                            last,
                        });
                    }
                    stall.stall(self.delay);
                }
            }
        }
    }
}
