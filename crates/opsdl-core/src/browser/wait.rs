//! Bounded polling and settle delays.
//!
//! Nothing on the site signals completion, so every wait is either a fixed
//! settle delay or a poll with a deadline. Both are cancellable.

use std::time::{Duration, Instant};

use crate::control::CancelToken;

/// Result of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll<T> {
    Ready(T),
    /// Not there yet; try again after the poll interval.
    Pending,
}

/// Why a bounded wait ended without a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    TimedOut,
    Cancelled,
}

/// Slice length used while sleeping so cancellation is noticed quickly.
const CANCEL_CHECK: Duration = Duration::from_millis(50);

/// Runs `probe` until it is `Ready`, the timeout elapses, or `cancel` fires.
///
/// The probe runs at least once, even with a zero timeout. Errors from the
/// probe abort the wait immediately and are returned as `Ok(Err(e))`.
pub fn poll_until<T, E, F>(
    timeout: Duration,
    interval: Duration,
    cancel: &CancelToken,
    mut probe: F,
) -> Result<Result<T, E>, WaitError>
where
    F: FnMut() -> Result<Poll<T>, E>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }
        match probe() {
            Ok(Poll::Ready(v)) => return Ok(Ok(v)),
            Ok(Poll::Pending) => {}
            Err(e) => return Ok(Err(e)),
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(WaitError::TimedOut);
        }
        sleep(interval.min(deadline - now), cancel)?;
    }
}

/// Fixed delay for the UI to settle after an action.
pub fn settle(delay: Duration, cancel: &CancelToken) -> Result<(), WaitError> {
    sleep(delay, cancel)
}

fn sleep(total: Duration, cancel: &CancelToken) -> Result<(), WaitError> {
    let end = Instant::now() + total;
    loop {
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }
        let now = Instant::now();
        if now >= end {
            return Ok(());
        }
        std::thread::sleep((end - now).min(CANCEL_CHECK));
    }
}
