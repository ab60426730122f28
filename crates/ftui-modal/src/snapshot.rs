#![forbid(unsafe_code)]

//! Outbound view contract: stack snapshots and change observers.
//!
//! After every stack change the scheduler publishes a [`StackSnapshot`] to
//! its observers. The view layer renders every descriptor in order and
//! routes input only to the one marked `interactive`.
//!
//! Observers are stored as `Weak` callbacks and cleaned up lazily during
//! notification, so dropping a [`StackSubscription`] detaches the observer
//! before the next change.

use std::rc::{Rc, Weak};

use crate::priority::PriorityClass;
use crate::request::ModalId;

/// Render-facing view of one stack instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDescriptor {
    /// Instance identifier.
    pub id: ModalId,
    /// Priority class.
    pub class: PriorityClass,
    /// Depth value for the renderer's ordering mechanism.
    pub layer_index: u64,
    /// Whether the user may dismiss it.
    pub closable: bool,
    /// Whether it receives input (foreground and not closing).
    pub interactive: bool,
    /// Whether its exit transition is running.
    pub closing: bool,
}

/// Ordered list of visible instances, bottom to top.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackSnapshot {
    /// Incremented on every published change.
    pub revision: u64,
    /// Visible instances, bottom to top.
    pub instances: Vec<InstanceDescriptor>,
}

impl StackSnapshot {
    /// The interactive instance, if any.
    #[must_use]
    pub fn interactive(&self) -> Option<&InstanceDescriptor> {
        self.instances.iter().rev().find(|d| d.interactive)
    }

    /// Whether nothing is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

type Callback = dyn Fn(&StackSnapshot);

/// RAII guard for a stack observer. Dropping it unsubscribes.
#[must_use = "dropping this guard unsubscribes the observer"]
pub struct StackSubscription {
    _callback: Rc<Callback>,
}

impl std::fmt::Debug for StackSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackSubscription").finish_non_exhaustive()
    }
}

/// Registered observers, notified in registration order.
#[derive(Default)]
pub(crate) struct Observers {
    listeners: Vec<Weak<Callback>>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, callback: impl Fn(&StackSnapshot) + 'static) -> StackSubscription {
        let callback: Rc<Callback> = Rc::new(callback);
        self.listeners.push(Rc::downgrade(&callback));
        StackSubscription {
            _callback: callback,
        }
    }

    pub(crate) fn notify(&mut self, snapshot: &StackSnapshot) {
        self.listeners.retain(|weak| weak.strong_count() > 0);
        for listener in &self.listeners {
            if let Some(callback) = listener.upgrade() {
                callback(snapshot);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("live", &self.len())
            .finish()
    }
}
