//! In-flight task counter with completion signalling.

use std::sync::Mutex;
use tokio::sync::Notify;

/// Counts extraction tasks that have been submitted but not yet completed.
///
/// The counter is incremented once per submission, before the task is
/// spawned, and decremented once per completion, strictly after the task's
/// body (including any further submissions it made) has returned. Under
/// that discipline the counter reading zero means the whole job is
/// complete: no floating tasks, no submissions still being prepared.
///
/// Waiters are woken through a [`Notify`] rather than polling.
#[derive(Debug, Default)]
pub struct InFlight {
    count: Mutex<usize>,
    zero: Notify,
}

impl InFlight {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one task submission.
    pub fn increment(&self) {
        let mut count = self.count.lock().expect("in-flight lock poisoned");
        *count += 1;
    }

    /// Records one task completion, waking waiters if the counter reaches
    /// zero.
    pub fn decrement(&self) {
        let mut count = self.count.lock().expect("in-flight lock poisoned");
        debug_assert!(*count > 0, "in-flight counter underflow");
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.zero.notify_waiters();
        }
    }

    /// Returns the current number of in-flight tasks.
    pub fn current(&self) -> usize {
        *self.count.lock().expect("in-flight lock poisoned")
    }

    /// Waits until the counter reaches zero.
    ///
    /// Returns immediately if it already is. The notified future is
    /// registered before the counter is checked, so a decrement landing
    /// between the check and the await cannot be missed.
    pub async fn wait_zero(&self) {
        loop {
            let notified = self.zero.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.current() == 0 {
                return;
            }
            notified.await;
        }
    }
}
