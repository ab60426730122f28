#![forbid(unsafe_code)]

//! Cancelable deadlines keyed by modal instance.
//!
//! The scheduler never sleeps; the host loop calls
//! [`Scheduler::tick`](crate::Scheduler::tick) and the due timers fire in
//! deadline order. Arming an existing key replaces its deadline, and
//! cancellation is tied to the instance's removal path.

use ahash::AHashMap;
use web_time::Instant;

use crate::request::ModalId;

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Close the instance with [`ModalOutcome::AutoClosed`](crate::ModalOutcome::AutoClosed).
    AutoClose,
    /// Finish a running exit transition.
    ExitTransition,
}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    seq: u64,
}

/// Pending deadlines.
#[derive(Debug, Default)]
pub(crate) struct Timers {
    pending: AHashMap<(ModalId, TimerKind), Deadline>,
    next_seq: u64,
}

impl Timers {
    pub(crate) fn arm(&mut self, id: ModalId, kind: TimerKind, at: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        tracing::trace!(%id, ?kind, "arm modal timer");
        self.pending.insert((id, kind), Deadline { at, seq });
    }

    pub(crate) fn cancel(&mut self, id: ModalId, kind: TimerKind) -> bool {
        self.pending.remove(&(id, kind)).is_some()
    }

    pub(crate) fn cancel_all_for(&mut self, id: ModalId) {
        self.pending.retain(|(timer_id, _), _| *timer_id != id);
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_armed(&self, id: ModalId, kind: TimerKind) -> bool {
        self.pending.contains_key(&(id, kind))
    }

    /// Earliest pending deadline.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|d| d.at).min()
    }

    /// Remove and return the earliest timer due at `now`.
    ///
    /// Ties break by arming order.
    pub(crate) fn pop_due(&mut self, now: Instant) -> Option<(ModalId, TimerKind)> {
        let key = self
            .pending
            .iter()
            .filter(|(_, d)| d.at <= now)
            .min_by_key(|(_, d)| (d.at, d.seq))
            .map(|(key, _)| *key)?;
        self.pending.remove(&key);
        Some(key)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}
