#![forbid(unsafe_code)]

//! Backlog of requests that are not yet admitted.
//!
//! # Invariants
//!
//! - Entries are sorted by `(class priority, submitted_at)` ascending.
//! - Insertion is stable: equal keys keep arrival order, so re-inserting a
//!   deferred entry puts it back exactly where it was.
//! - An entry leaves the queue exactly once: into the stack, or through an
//!   explicit removal (cancel, teardown).
//!
//! # Failure Modes
//!
//! - `peek_admissible` on an empty or fully suppressed queue returns `None`.
//! - `remove` of an unknown id returns `None`.

use crate::mode::{ApplicationMode, SuppressionPolicy};
use crate::priority::PriorityClass;
use crate::request::{ModalId, Submission};

/// Priority-ordered queue of waiting submissions.
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    items: Vec<Submission>,
}

impl RequestQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping the sort order.
    pub(crate) fn enqueue(&mut self, submission: Submission) {
        let key = (submission.class, submission.submitted_at);
        let idx = self
            .items
            .partition_point(|queued| (queued.class, queued.submitted_at) <= key);
        tracing::trace!(
            id = %submission.id,
            class = %submission.class,
            position = idx,
            "enqueue modal request"
        );
        self.items.insert(idx, submission);
    }

    /// First entry whose class is not suppressed under `mode`.
    #[must_use]
    pub fn peek_admissible(
        &self,
        mode: Option<ApplicationMode>,
        policy: &SuppressionPolicy,
    ) -> Option<&Submission> {
        let suppressed = policy.suppressed(mode);
        self.items.iter().find(|queued| !suppressed.has(queued.class))
    }

    /// Remove a specific entry.
    pub(crate) fn remove(&mut self, id: ModalId) -> Option<Submission> {
        let idx = self.items.iter().position(|queued| queued.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Take every entry, in queue order.
    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, Submission> {
        self.items.drain(..)
    }

    /// Whether any entry of `class` is waiting.
    #[must_use]
    pub fn has_class(&self, class: PriorityClass) -> bool {
        self.items.iter().any(|queued| queued.class == class)
    }

    /// Whether the entry is waiting here.
    #[must_use]
    pub fn contains(&self, id: ModalId) -> bool {
        self.items.iter().any(|queued| queued.id == id)
    }

    /// Get a waiting entry.
    #[must_use]
    pub fn get(&self, id: ModalId) -> Option<&Submission> {
        self.items.iter().find(|queued| queued.id == id)
    }

    /// Entries in admission order.
    pub fn iter(&self) -> impl Iterator<Item = &Submission> {
        self.items.iter()
    }

    /// Number of waiting entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is waiting.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ModalRequest;

    fn sub(kind: &str, id: u64, seq: u64) -> Submission {
        Submission::resolve(
            ModalRequest::new(kind).concurrent(),
            ModalId::new(id),
            seq,
            499,
        )
    }

    fn ids(queue: &RequestQueue) -> Vec<u64> {
        queue.iter().map(|s| s.id().id()).collect()
    }

    #[test]
    fn sorted_by_class_then_arrival() {
        let mut queue = RequestQueue::new();
        queue.enqueue(sub("toast", 1, 0));
        queue.enqueue(sub("attention", 2, 1));
        queue.enqueue(sub("critical", 3, 2));
        queue.enqueue(sub("attention", 4, 3));
        assert_eq!(ids(&queue), vec![3, 2, 4, 1]);
    }

    #[test]
    fn reinsert_restores_position() {
        let mut queue = RequestQueue::new();
        queue.enqueue(sub("attention", 1, 0));
        queue.enqueue(sub("attention", 2, 1));
        queue.enqueue(sub("attention", 3, 2));
        let taken = queue.remove(ModalId::new(1)).expect("present");
        queue.enqueue(taken);
        assert_eq!(ids(&queue), vec![1, 2, 3]);
    }

    #[test]
    fn peek_skips_suppressed_classes() {
        let policy = SuppressionPolicy::new();
        let mut queue = RequestQueue::new();
        queue.enqueue(sub("attention", 1, 0));
        queue.enqueue(sub("blocking", 2, 1));
        let tutorial = Some(ApplicationMode::Tutorial);

        // Blocking sorts first anyway.
        assert_eq!(
            queue.peek_admissible(tutorial, &policy).map(Submission::id),
            Some(ModalId::new(2))
        );
        queue.remove(ModalId::new(2));
        assert!(queue.peek_admissible(tutorial, &policy).is_none());
        assert_eq!(queue.len(), 1, "peek must not mutate");
        assert_eq!(
            queue.peek_admissible(None, &policy).map(Submission::id),
            Some(ModalId::new(1))
        );
    }

    #[test]
    fn empty_queue_peeks_none() {
        let queue = RequestQueue::new();
        assert!(queue.is_empty());
        assert!(queue.peek_admissible(None, &SuppressionPolicy::new()).is_none());
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut queue = RequestQueue::new();
        queue.enqueue(sub("toast", 1, 0));
        assert!(queue.remove(ModalId::new(99)).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn drain_empties_in_order() {
        let mut queue = RequestQueue::new();
        queue.enqueue(sub("toast", 1, 0));
        queue.enqueue(sub("blocking", 2, 1));
        let drained: Vec<u64> = queue.drain().map(|s| s.id().id()).collect();
        assert_eq!(drained, vec![2, 1]);
        assert!(queue.is_empty());
    }

    #[test]
    fn class_and_membership_queries() {
        let mut queue = RequestQueue::new();
        queue.enqueue(sub("notice", 5, 0));
        assert!(queue.has_class(PriorityClass::Notification));
        assert!(!queue.has_class(PriorityClass::Toast));
        assert!(queue.contains(ModalId::new(5)));
        assert_eq!(queue.get(ModalId::new(5)).map(Submission::kind), Some("notice"));
    }
}
