#![forbid(unsafe_code)]

//! One-shot result channel returned by [`Scheduler::submit`](crate::Scheduler::submit).
//!
//! Each submission gets a [`ModalHandle`] (the receiving half) while the
//! scheduler keeps a [`Resolver`] (the sending half). Resolving consumes the
//! resolver, so a request can only ever be resolved once.
//!
//! # Failure Modes
//!
//! - Dropping the handle before resolution is allowed; the outcome is discarded.
//! - Dropping the scheduler while a request is pending resolves the handle to
//!   [`ModalOutcome::Dropped`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;

use crate::request::ModalId;

/// Value a shown modal was closed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalResultData {
    /// Dialog was dismissed (escaped or cancelled).
    Dismissed,
    /// Dialog was confirmed.
    Confirmed,
    /// Dialog returned a custom value.
    Custom(String),
}

/// Terminal state of a modal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    /// Shown, then closed with a value.
    Closed(ModalResultData),
    /// Shown, then closed by its own lifetime timer.
    AutoClosed,
    /// Shown, then torn down by [`Scheduler::close_all`](crate::Scheduler::close_all).
    ForceClosed,
    /// Never shown: an instance with the same identity key was already up.
    Duplicate,
    /// Never shown: closed while still waiting in the queue.
    Canceled,
    /// Never shown: discarded during teardown.
    Dropped,
}

impl ModalOutcome {
    /// Whether the instance was ever admitted to the stack.
    #[must_use]
    pub fn was_shown(&self) -> bool {
        matches!(self, Self::Closed(_) | Self::AutoClosed | Self::ForceClosed)
    }

    /// The close value, for instances closed through [`Scheduler::close`](crate::Scheduler::close).
    #[must_use]
    pub fn data(&self) -> Option<&ModalResultData> {
        match self {
            Self::Closed(data) => Some(data),
            _ => None,
        }
    }
}

/// Sending half, owned by the scheduler.
#[derive(Debug)]
pub(crate) struct Resolver {
    id: ModalId,
    tx: oneshot::Sender<ModalOutcome>,
}

impl Resolver {
    pub(crate) fn resolve(self, outcome: ModalOutcome) {
        tracing::trace!(id = %self.id, ?outcome, "resolving modal outcome");
        if self.tx.send(outcome).is_err() {
            tracing::trace!(id = %self.id, "modal handle dropped before resolution");
        }
    }
}

/// Awaitable result of a single submission.
///
/// Poll it with [`try_outcome`](Self::try_outcome) from an event loop, or
/// `.await` it from async code.
#[derive(Debug)]
#[must_use = "dropping the handle discards the modal's outcome"]
pub struct ModalHandle {
    id: ModalId,
    rx: oneshot::Receiver<ModalOutcome>,
    settled: Option<ModalOutcome>,
}

pub(crate) fn channel(id: ModalId) -> (Resolver, ModalHandle) {
    let (tx, rx) = oneshot::channel();
    (
        Resolver { id, tx },
        ModalHandle {
            id,
            rx,
            settled: None,
        },
    )
}

impl ModalHandle {
    /// Identifier of the submitted request.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ModalId {
        self.id
    }

    /// Non-blocking check for the outcome.
    ///
    /// Returns `None` while the request is queued or shown. Once resolved,
    /// every call returns the same outcome.
    pub fn try_outcome(&mut self) -> Option<ModalOutcome> {
        if self.settled.is_none() {
            self.settled = match self.rx.try_recv() {
                Ok(Some(outcome)) => Some(outcome),
                Ok(None) => None,
                Err(oneshot::Canceled) => Some(ModalOutcome::Dropped),
            };
        }
        self.settled.clone()
    }

    /// Whether the outcome is available.
    #[must_use]
    pub fn is_resolved(&mut self) -> bool {
        self.try_outcome().is_some()
    }
}

impl Future for ModalHandle {
    type Output = ModalOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = &self.settled {
            return Poll::Ready(outcome.clone());
        }
        let outcome = match self.rx.poll_unpin(cx) {
            Poll::Ready(Ok(outcome)) => outcome,
            Poll::Ready(Err(oneshot::Canceled)) => ModalOutcome::Dropped,
            Poll::Pending => return Poll::Pending,
        };
        self.settled = Some(outcome.clone());
        Poll::Ready(outcome)
    }
}
