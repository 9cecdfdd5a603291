use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Latch that lets shutdown block until every started flight cycle has ended
/// with the drone grounded and halted. A cycle begins when the drone reports
/// a connection and ends when the terminal done action runs.
#[derive(Debug, Default)]
pub struct CompletionLatch {
    active: AtomicUsize,
    grounded: Notify,
}

impl CompletionLatch {
    /// Marks the start of a flight cycle.
    pub fn begin(&self) { self.active.fetch_add(1, Ordering::AcqRel); }

    /// Marks the end of a flight cycle. Saturates at zero so a stray done
    /// input can never underflow the counter.
    pub fn release(&self) {
        let res = self.active.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if res.is_ok() {
            self.grounded.notify_waiters();
        }
    }

    /// Resolves once no flight cycle is active. Returns immediately if none
    /// was ever started.
    pub async fn wait(&self) {
        loop {
            let notified = self.grounded.notified();
            tokio::pin!(notified);
            // `notify_waiters` only reaches futures that are already
            // enabled, so enable before checking the counter.
            notified.as_mut().enable();
            if self.active.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    pub fn active(&self) -> usize { self.active.load(Ordering::Acquire) }
}
