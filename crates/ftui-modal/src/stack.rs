#![forbid(unsafe_code)]

//! Presentation stack of admitted modal instances.
//!
//! The `PresentationStack` holds every admitted instance in stacking order.
//! Only the topmost instance (the foreground) is interactive; everything below
//! stays present but inert.
//!
//! # Invariants
//!
//! - At most one instance per identity key.
//! - Instances are ordered bottom to top by `(class importance, layer weight,
//!   admission order)`; the last one is the foreground.
//! - Layer indices are recomputed on every membership change and are strictly
//!   increasing bottom to top (given a valid [`Layering`]).
//! - A closing instance keeps its slot and identity until it is removed.
//!
//! # Failure Modes
//!
//! - `push()` of a duplicate identity hands the submission back.
//! - `remove()` / `get()` for a non-existent id return `None`.
//! - `begin_closing()` on an unknown or already-closing id returns `false`.

use crate::outcome::ModalOutcome;
use crate::priority::PriorityClass;
use crate::request::{ModalId, Submission};
use crate::snapshot::InstanceDescriptor;

/// Base layer for the modal band.
pub const BASE_MODAL_Z: u32 = 1000;

/// Layer increment between stack positions (leaves room for internal layers).
pub const Z_INCREMENT: u32 = 10;

/// Layer distance between adjacent priority classes.
pub const CLASS_BAND: u32 = 1000;

/// Largest accepted layer weight magnitude.
pub const MAX_LAYER_WEIGHT: i32 = 499;

/// Constants for layer index computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layering {
    /// Layer of the bottom-most slot before biases.
    pub base: u32,
    /// Added per stack position.
    pub stack_increment: u32,
    /// Added per class importance step.
    pub class_band: u32,
    /// Weights are clamped to `±max_weight`.
    pub max_weight: i32,
}

impl Default for Layering {
    fn default() -> Self {
        Self {
            base: BASE_MODAL_Z,
            stack_increment: Z_INCREMENT,
            class_band: CLASS_BAND,
            max_weight: MAX_LAYER_WEIGHT,
        }
    }
}

impl Layering {
    /// Whether weights can never reorder layers across classes.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.max_weight >= 0 && (self.max_weight as u64) * 2 < u64::from(self.class_band)
    }

    fn layer_for(&self, class: PriorityClass, weight: i32, position: usize) -> u64 {
        let class_bias = u64::from(class.importance()) * u64::from(self.class_band);
        let weight_bias =
            u64::try_from(i64::from(weight) + i64::from(self.max_weight)).unwrap_or(0);
        let position = u64::try_from(position).unwrap_or(u64::MAX);
        (u64::from(self.base) + class_bias + weight_bias)
            .saturating_add(position.saturating_mul(u64::from(self.stack_increment)))
    }
}

/// Lifecycle phase of an admitted instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstancePhase {
    /// Visible and accepting input when in the foreground.
    Admitted,
    /// Running its exit transition; resolves with `outcome` once removed.
    Closing {
        /// Outcome delivered when the transition completes.
        outcome: ModalOutcome,
    },
}

/// An admitted modal instance.
#[derive(Debug, Clone)]
pub struct ModalInstance {
    submission: Submission,
    layer_index: u64,
    phase: InstancePhase,
    admitted_seq: u64,
}

impl ModalInstance {
    /// Instance identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ModalId {
        self.submission.id
    }

    /// The submission this instance was admitted from.
    #[must_use]
    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Priority class.
    #[inline]
    #[must_use]
    pub fn class(&self) -> PriorityClass {
        self.submission.class
    }

    /// Current layer index.
    #[inline]
    #[must_use]
    pub fn layer_index(&self) -> u64 {
        self.layer_index
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> &InstancePhase {
        &self.phase
    }

    /// Whether the exit transition is running.
    #[inline]
    #[must_use]
    pub fn is_closing(&self) -> bool {
        matches!(self.phase, InstancePhase::Closing { .. })
    }

    pub(crate) fn into_parts(self) -> (Submission, InstancePhase) {
        (self.submission, self.phase)
    }

    fn sort_key(&self) -> (u8, i32, u64) {
        (
            self.submission.class.importance(),
            self.submission.layer_weight,
            self.admitted_seq,
        )
    }
}

/// Stack of admitted modal instances.
#[derive(Debug, Clone)]
pub struct PresentationStack {
    /// Instances in stacking order (bottom to top).
    instances: Vec<ModalInstance>,
    layering: Layering,
    next_seq: u64,
}

impl Default for PresentationStack {
    fn default() -> Self {
        Self::new(Layering::default())
    }
}

impl PresentationStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new(layering: Layering) -> Self {
        Self {
            instances: Vec::new(),
            layering,
            next_seq: 0,
        }
    }

    // --- Stack Operations ---

    /// Whether no instance holds `identity_key`.
    #[must_use]
    pub fn can_admit(&self, identity_key: &str) -> bool {
        !self
            .instances
            .iter()
            .any(|m| m.submission.identity_key == identity_key)
    }

    /// Admit a submission.
    ///
    /// Returns the submission unchanged if its identity key is already taken.
    pub(crate) fn push(&mut self, submission: Submission) -> Result<&ModalInstance, Submission> {
        if !self.can_admit(&submission.identity_key) {
            return Err(submission);
        }
        let instance = ModalInstance {
            submission,
            layer_index: 0,
            phase: InstancePhase::Admitted,
            admitted_seq: self.next_seq,
        };
        self.next_seq += 1;

        let key = instance.sort_key();
        let idx = self.instances.partition_point(|m| m.sort_key() <= key);
        self.instances.insert(idx, instance);
        self.recompute_layers();
        Ok(&self.instances[idx])
    }

    /// Remove a specific instance (not necessarily the top).
    pub(crate) fn remove(&mut self, id: ModalId) -> Option<ModalInstance> {
        let idx = self.position(id)?;
        let instance = self.instances.remove(idx);
        self.recompute_layers();
        Some(instance)
    }

    /// Take every instance, top first.
    pub(crate) fn take_all(&mut self) -> Vec<ModalInstance> {
        let mut taken: Vec<ModalInstance> = self.instances.drain(..).collect();
        taken.reverse();
        taken
    }

    /// Move an admitted instance into its closing phase.
    pub(crate) fn begin_closing(&mut self, id: ModalId, outcome: ModalOutcome) -> bool {
        match self.instances.iter_mut().find(|m| m.id() == id) {
            Some(instance) if !instance.is_closing() => {
                instance.phase = InstancePhase::Closing { outcome };
                true
            }
            _ => false,
        }
    }

    fn recompute_layers(&mut self) {
        let layering = self.layering;
        for (position, instance) in self.instances.iter_mut().enumerate() {
            instance.layer_index = layering.layer_for(
                instance.submission.class,
                instance.submission.layer_weight,
                position,
            );
        }
    }

    fn position(&self, id: ModalId) -> Option<usize> {
        self.instances.iter().position(|m| m.id() == id)
    }

    // --- State Queries ---

    /// The foreground (topmost) instance.
    #[must_use]
    pub fn foreground(&self) -> Option<&ModalInstance> {
        self.instances.last()
    }

    /// Get an instance by id.
    #[must_use]
    pub fn get(&self, id: ModalId) -> Option<&ModalInstance> {
        self.instances.iter().find(|m| m.id() == id)
    }

    /// Check if an instance with the given ID exists in the stack.
    #[must_use]
    pub fn contains(&self, id: ModalId) -> bool {
        self.position(id).is_some()
    }

    /// Whether any instance keeps lower classes waiting.
    #[must_use]
    pub fn has_blocking(&self) -> bool {
        self.instances
            .iter()
            .any(|m| m.class().blocks_lower_classes())
    }

    /// Whether any instance is mid exit transition.
    #[must_use]
    pub fn has_closing(&self) -> bool {
        self.instances.iter().any(ModalInstance::is_closing)
    }

    /// Instances bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ModalInstance> {
        self.instances.iter()
    }

    /// Check if the stack is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Get the number of instances in the stack.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.instances.len()
    }

    /// Render descriptors, bottom to top.
    ///
    /// Only an admitted foreground instance is marked interactive.
    #[must_use]
    pub fn descriptors(&self) -> Vec<InstanceDescriptor> {
        let top = self.instances.len().checked_sub(1);
        self.instances
            .iter()
            .enumerate()
            .map(|(i, m)| InstanceDescriptor {
                id: m.id(),
                class: m.class(),
                layer_index: m.layer_index,
                closable: m.submission.closable,
                interactive: Some(i) == top && !m.is_closing(),
                closing: m.is_closing(),
            })
            .collect()
    }
}
