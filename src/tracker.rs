use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one in-flight analysis request. Created at issuance, compared
/// once at completion, then discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHandle(u64);

/// Tracks which request is "current" under a last-submission-wins policy.
///
/// There is no queue and no transport cancellation: a superseded request is
/// allowed to finish, and its result is dropped by the caller when
/// [`RequestTracker::is_current`] says so. The outstanding count exists for
/// the busy indicator only and saturates at zero.
#[derive(Debug, Default)]
pub struct RequestTracker {
    issued: AtomicU64,
    outstanding: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new handle, strictly greater than any issued before, and
    /// records it as current.
    pub fn begin(&self) -> RequestHandle {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        RequestHandle(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True iff `handle` is the most recently issued one.
    pub fn is_current(&self, handle: RequestHandle) -> bool {
        handle.0 == self.issued.load(Ordering::SeqCst)
    }

    /// Marks one completion (applied, stale or failed alike) and returns the
    /// number of requests still in flight.
    pub fn finish(&self) -> u64 {
        let prev = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_sub(1))
            })
            .unwrap_or(0);
        prev.saturating_sub(1)
    }

    pub fn outstanding(&self) -> u64 {
        self.outstanding.load(Ordering::SeqCst)
    }
}
