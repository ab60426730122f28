#![forbid(unsafe_code)]

//! The modal scheduler: admission, queueing, closing and teardown.
//!
//! A [`Scheduler`] owns one [`PresentationStack`] and one [`RequestQueue`].
//! Collaborators only submit requests, close them, and toggle the
//! application mode; they never touch the stack or queue directly.
//!
//! # Admission
//!
//! A request is checked against these rules in order. The first rule that
//! matches decides:
//!
//! 1. Its class is suppressed under the current mode: it waits.
//! 2. An exit transition is running: it waits (one foreground at a time).
//! 3. An earlier request of the same class is waiting: it waits behind it.
//! 4. A blocking instance is shown and this class does not block: it waits.
//! 5. Its identity key is already shown: it resolves as
//!    [`ModalOutcome::Duplicate`] and is discarded.
//! 6. Otherwise it is pushed, and its auto-close timer is armed if it has a
//!    lifetime.
//!
//! The queue is re-evaluated whenever an instance finishes closing and
//! whenever the mode changes.
//!
//! # Invariants
//!
//! - Every submission resolves exactly once: its resolver is consumed on the
//!   first resolution and later closes find nothing to resolve.
//! - Among equal classes, admission order equals submission order.
//! - `drain_queue` is never re-entered and stops after at most one pass over
//!   the queue.
//!
//! # Failure Modes
//!
//! - `close()` of an unknown, closing or already-closed id is a no-op.
//! - An auto-close timer that fires after a manual close finds the timer
//!   canceled, or the instance gone, and does nothing.
//! - Dropping the scheduler resolves every pending handle to
//!   [`ModalOutcome::Dropped`].
//!
//! # Example
//!
//! ```
//! use ftui_modal::{ModalOutcome, ModalRequest, ModalResultData, Scheduler};
//!
//! let mut modals = Scheduler::default();
//! let mut confirm = modals.submit(ModalRequest::new("blocking")).unwrap();
//! let mut toast = modals.submit(ModalRequest::new("toast")).unwrap();
//!
//! // The toast waits behind the blocking dialog.
//! assert_eq!(modals.queue().len(), 1);
//!
//! modals.close(confirm.id(), ModalResultData::Confirmed);
//! assert_eq!(
//!     confirm.try_outcome(),
//!     Some(ModalOutcome::Closed(ModalResultData::Confirmed))
//! );
//! assert_eq!(modals.foreground().map(|m| m.id()), Some(toast.id()));
//! assert_eq!(toast.try_outcome(), None);
//! ```

use ahash::AHashMap;
use web_time::Instant;

use crate::config::SchedulerConfig;
use crate::error::{ConfigError, SubmitError};
use crate::mode::ApplicationMode;
use crate::outcome::{self, ModalHandle, ModalOutcome, ModalResultData, Resolver};
use crate::queue::RequestQueue;
use crate::request::{ModalId, ModalRequest, Submission};
use crate::snapshot::{Observers, StackSnapshot, StackSubscription};
use crate::stack::{InstancePhase, ModalInstance, PresentationStack};
use crate::timer::{TimerKind, Timers};

/// Where a live request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Waiting for admission.
    Queued,
    /// Admitted to the stack.
    Shown,
    /// Admitted and running its exit transition.
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferReason {
    Suppressed,
    Transition,
    Backlog,
    Blocked,
}

#[derive(Debug)]
enum Admission {
    Admitted,
    Deferred(Submission, DeferReason),
    Duplicate(Submission),
}

/// Modal presentation scheduler.
///
/// Single-threaded: every operation takes `&mut self` and runs to completion.
#[derive(Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    stack: PresentationStack,
    queue: RequestQueue,
    /// Sending halves of every live request, keyed by id.
    resolvers: AHashMap<ModalId, Resolver>,
    timers: Timers,
    observers: Observers,
    mode: Option<ApplicationMode>,
    now: Instant,
    next_id: u64,
    next_seq: u64,
    revision: u64,
    draining: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl Scheduler {
    /// Create a scheduler whose clock starts now.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_start(config, Instant::now())
    }

    /// Create a scheduler after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`SchedulerConfig::validate`].
    pub fn try_new(config: SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Create a scheduler whose clock starts at `start`.
    #[must_use]
    pub fn with_start(config: SchedulerConfig, start: Instant) -> Self {
        Self {
            stack: PresentationStack::new(config.layering),
            config,
            queue: RequestQueue::new(),
            resolvers: AHashMap::new(),
            timers: Timers::default(),
            observers: Observers::default(),
            mode: None,
            now: start,
            next_id: 1,
            next_seq: 0,
            revision: 0,
            draining: false,
        }
    }

    // --- Requests ---

    /// Submit a modal request.
    ///
    /// The handle is returned whether the request was admitted, queued or
    /// rejected as a duplicate.
    ///
    /// # Errors
    ///
    /// Fails before any state changes when the kind or identity key is empty,
    /// or when a caller-supplied id is still live.
    pub fn submit(&mut self, request: ModalRequest) -> Result<ModalHandle, SubmitError> {
        if request.kind.trim().is_empty() {
            tracing::warn!("rejected modal request with empty kind");
            return Err(SubmitError::EmptyKind);
        }
        if request
            .identity_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            tracing::warn!(kind = %request.kind, "rejected modal request with empty identity key");
            return Err(SubmitError::EmptyIdentityKey);
        }
        let id = match request.id {
            Some(id) if self.resolvers.contains_key(&id) => {
                tracing::warn!(%id, "rejected modal request with live id");
                return Err(SubmitError::DuplicateId(id));
            }
            Some(id) => id,
            None => self.generate_id(),
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        let submission = Submission::resolve(request, id, seq, self.config.layering.max_weight);
        tracing::debug!(
            %id,
            class = %submission.class,
            identity = %submission.identity_key,
            "modal submitted"
        );

        let (resolver, handle) = outcome::channel(id);
        self.resolvers.insert(id, resolver);
        match self.admit(submission, false) {
            Admission::Admitted => self.publish(),
            Admission::Deferred(submission, reason) => self.defer(submission, reason),
            Admission::Duplicate(submission) => self.reject_duplicate(&submission),
        }
        Ok(handle)
    }

    /// Close a request with `result`.
    ///
    /// A shown instance closes (after its exit transition, if configured); a
    /// queued request is canceled. Returns `false` for unknown, closing or
    /// already-closed ids.
    pub fn close(&mut self, id: ModalId, result: ModalResultData) -> bool {
        if self.stack.contains(id) {
            return self.begin_close(id, ModalOutcome::Closed(result));
        }
        if let Some(submission) = self.queue.remove(id) {
            tracing::debug!(%id, class = %submission.class, "queued modal canceled");
            self.resolve(id, ModalOutcome::Canceled);
            return true;
        }
        tracing::trace!(%id, "close of unknown modal ignored");
        false
    }

    /// User dismissal: close the foreground if it is closable.
    ///
    /// Returns the id of the dismissed instance.
    pub fn dismiss_foreground(&mut self) -> Option<ModalId> {
        let top = self.stack.foreground()?;
        if top.is_closing() || !top.submission().is_closable() {
            return None;
        }
        let id = top.id();
        self.begin_close(id, ModalOutcome::Closed(ModalResultData::Dismissed))
            .then_some(id)
    }

    /// Change the application mode and re-evaluate the queue.
    pub fn set_mode(&mut self, mode: Option<ApplicationMode>) {
        if self.mode == mode {
            return;
        }
        tracing::debug!(from = ?self.mode, to = ?mode, "application mode changed");
        self.mode = mode;
        self.drain_queue();
    }

    /// Admit waiting requests while any are admissible.
    ///
    /// Returns how many were admitted. Calls made while a drain is already
    /// running return zero.
    pub fn drain_queue(&mut self) -> usize {
        if self.draining {
            return 0;
        }
        self.draining = true;
        let mut admitted = 0;
        while let Some(id) = self
            .queue
            .peek_admissible(self.mode, &self.config.suppression)
            .map(Submission::id)
        {
            let Some(submission) = self.queue.remove(id) else {
                break;
            };
            match self.admit(submission, true) {
                Admission::Admitted => {
                    admitted += 1;
                    self.publish();
                }
                Admission::Duplicate(submission) => self.reject_duplicate(&submission),
                Admission::Deferred(submission, reason) => {
                    tracing::trace!(%id, ?reason, "drain stopped");
                    self.queue.enqueue(submission);
                    break;
                }
            }
        }
        self.draining = false;
        admitted
    }

    /// Teardown: force-close every shown instance and drop every queued request.
    pub fn close_all(&mut self) {
        self.timers.clear();
        let instances = self.stack.take_all();
        let queued: Vec<ModalId> = self.queue.drain().map(|s| s.id).collect();
        tracing::debug!(
            shown = instances.len(),
            queued = queued.len(),
            "closing all modals"
        );
        let had_instances = !instances.is_empty();
        for instance in instances {
            self.resolve(instance.id(), ModalOutcome::ForceClosed);
        }
        for id in queued {
            self.resolve(id, ModalOutcome::Dropped);
        }
        if had_instances {
            self.publish();
        }
    }

    // --- Time ---

    /// Advance the clock to `now` and fire due timers.
    ///
    /// Returns the number of timers fired. The clock never moves backwards.
    pub fn tick(&mut self, now: Instant) -> usize {
        if now > self.now {
            self.now = now;
        }
        let mut fired = 0;
        while let Some((id, kind)) = self.timers.pop_due(self.now) {
            fired += 1;
            match kind {
                TimerKind::AutoClose => {
                    tracing::debug!(%id, "modal lifetime elapsed");
                    self.begin_close(id, ModalOutcome::AutoClosed);
                }
                TimerKind::ExitTransition => self.finish_close(id),
            }
        }
        fired
    }

    /// Earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Current scheduler clock.
    #[inline]
    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }

    // --- Queries ---

    /// Current application mode.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> Option<ApplicationMode> {
        self.mode
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The foreground instance.
    #[must_use]
    pub fn foreground(&self) -> Option<&ModalInstance> {
        self.stack.foreground()
    }

    /// Admitted instances.
    #[must_use]
    pub fn stack(&self) -> &PresentationStack {
        &self.stack
    }

    /// Waiting requests.
    #[must_use]
    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    /// Where a live request is, or `None` once it has resolved.
    #[must_use]
    pub fn status(&self, id: ModalId) -> Option<RequestStatus> {
        if let Some(instance) = self.stack.get(id) {
            return Some(if instance.is_closing() {
                RequestStatus::Closing
            } else {
                RequestStatus::Shown
            });
        }
        self.queue.contains(id).then_some(RequestStatus::Queued)
    }

    /// Whether nothing is shown or waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty() && self.queue.is_empty()
    }

    /// Current render view.
    #[must_use]
    pub fn snapshot(&self) -> StackSnapshot {
        StackSnapshot {
            revision: self.revision,
            instances: self.stack.descriptors(),
        }
    }

    /// Observe stack changes. Dropping the guard unsubscribes.
    pub fn subscribe(&mut self, callback: impl Fn(&StackSnapshot) + 'static) -> StackSubscription {
        self.observers.subscribe(callback)
    }

    // --- Internals ---

    fn generate_id(&mut self) -> ModalId {
        loop {
            let id = ModalId::new(self.next_id);
            self.next_id += 1;
            if !self.resolvers.contains_key(&id) {
                return id;
            }
        }
    }

    fn admit(&mut self, submission: Submission, from_queue: bool) -> Admission {
        let class = submission.class;
        if self.config.suppression.is_suppressed(class, self.mode) {
            return Admission::Deferred(submission, DeferReason::Suppressed);
        }
        if self.stack.has_closing() {
            return Admission::Deferred(submission, DeferReason::Transition);
        }
        if !from_queue && self.queue.has_class(class) {
            return Admission::Deferred(submission, DeferReason::Backlog);
        }
        if self.stack.has_blocking() && !class.blocks_lower_classes() {
            return Admission::Deferred(submission, DeferReason::Blocked);
        }

        let lifetime = submission
            .auto_close_after
            .or_else(|| self.config.lifetime_for(class));
        let (id, layer) = match self.stack.push(submission) {
            Ok(instance) => (instance.id(), instance.layer_index()),
            Err(submission) => return Admission::Duplicate(submission),
        };
        // A lifetime past the clock's range never elapses.
        if let Some(at) = lifetime.and_then(|lifetime| self.now.checked_add(lifetime)) {
            self.timers.arm(id, TimerKind::AutoClose, at);
        }
        tracing::debug!(%id, %class, layer, ?lifetime, "modal admitted");
        Admission::Admitted
    }

    fn defer(&mut self, submission: Submission, reason: DeferReason) {
        tracing::debug!(
            id = %submission.id,
            class = %submission.class,
            ?reason,
            mode = ?self.mode,
            "modal queued"
        );
        self.queue.enqueue(submission);
    }

    fn reject_duplicate(&mut self, submission: &Submission) {
        tracing::debug!(
            id = %submission.id,
            identity = %submission.identity_key,
            "duplicate modal not shown"
        );
        self.resolve(submission.id, ModalOutcome::Duplicate);
    }

    fn begin_close(&mut self, id: ModalId, outcome: ModalOutcome) -> bool {
        if !self.stack.begin_closing(id, outcome) {
            tracing::trace!(%id, "modal already closing");
            return false;
        }
        self.timers.cancel(id, TimerKind::AutoClose);
        let transition = self.config.exit_transition;
        let finish_at = if transition.is_zero() {
            None
        } else {
            self.now.checked_add(transition)
        };
        match finish_at {
            Some(at) => {
                self.timers.arm(id, TimerKind::ExitTransition, at);
                self.publish();
            }
            // Zero, or too long to schedule: finish synchronously.
            None => self.finish_close(id),
        }
        true
    }

    fn finish_close(&mut self, id: ModalId) {
        self.timers.cancel_all_for(id);
        let Some(instance) = self.stack.remove(id) else {
            return;
        };
        let (submission, phase) = instance.into_parts();
        let outcome = match phase {
            InstancePhase::Closing { outcome } => outcome,
            InstancePhase::Admitted => ModalOutcome::ForceClosed,
        };
        tracing::debug!(%id, class = %submission.class, ?outcome, "modal closed");
        self.resolve(id, outcome);
        self.publish();
        self.drain_queue();
    }

    fn resolve(&mut self, id: ModalId, outcome: ModalOutcome) {
        if let Some(resolver) = self.resolvers.remove(&id) {
            resolver.resolve(outcome);
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = self.snapshot();
        self.observers.notify(&snapshot);
    }

    #[cfg(test)]
    pub(crate) fn live_requests(&self) -> usize {
        self.resolvers.len()
    }

    #[cfg(test)]
    pub(crate) fn has_timer(&self, id: ModalId, kind: TimerKind) -> bool {
        self.timers.is_armed(id, kind)
    }
}
