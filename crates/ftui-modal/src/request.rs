#![forbid(unsafe_code)]

//! Modal requests as submitted by collaborators.

use std::fmt;
use std::time::Duration;

use crate::priority::PriorityClass;

/// Unique identifier for a modal request.
///
/// Either supplied by the caller through [`ModalRequest::with_id`] or generated
/// by the scheduler on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(u64);

impl ModalId {
    /// Wrap a raw identifier.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID value.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modal#{}", self.0)
    }
}

/// A request for a modal, built by the submitter.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ftui_modal::ModalRequest;
///
/// let request = ModalRequest::new("notification")
///     .identity_key("autosave")
///     .auto_close_after(Duration::from_secs(2))
///     .closable(false);
/// assert_eq!(request.kind(), "notification");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalRequest {
    pub(crate) id: Option<ModalId>,
    pub(crate) kind: String,
    pub(crate) identity_key: Option<String>,
    pub(crate) concurrent: bool,
    pub(crate) closable: bool,
    pub(crate) auto_close_after: Option<Duration>,
    pub(crate) layer_weight: i32,
}

impl ModalRequest {
    /// Create a request of the given kind with default behavior.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            identity_key: None,
            concurrent: false,
            closable: true,
            auto_close_after: None,
            layer_weight: 0,
        }
    }

    /// Use a caller-chosen identifier instead of a generated one.
    #[must_use]
    pub fn with_id(mut self, id: ModalId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the deduplication key. Defaults to the kind.
    #[must_use]
    pub fn identity_key(mut self, key: impl Into<String>) -> Self {
        self.identity_key = Some(key.into());
        self
    }

    /// Allow several identical instances to be shown at once.
    ///
    /// Without an explicit identity key, each instance is keyed by its own id.
    #[must_use]
    pub fn concurrent(mut self) -> Self {
        self.concurrent = true;
        self
    }

    /// Set whether the user may dismiss the instance (overlay click, cancel key).
    #[must_use]
    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = closable;
        self
    }

    /// Close the instance automatically this long after admission.
    ///
    /// Applies to every class, including blocking ones.
    #[must_use]
    pub fn auto_close_after(mut self, lifetime: Duration) -> Self {
        self.auto_close_after = Some(lifetime);
        self
    }

    /// Bias the instance's stacking position within its class.
    #[must_use]
    pub fn layer_weight(mut self, weight: i32) -> Self {
        self.layer_weight = weight;
        self
    }

    /// The declared kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The caller-supplied id, if any.
    #[must_use]
    pub fn id(&self) -> Option<ModalId> {
        self.id
    }

    /// Class this request classifies into.
    #[must_use]
    pub fn class(&self) -> PriorityClass {
        PriorityClass::classify(&self.kind)
    }
}

/// A request that has been accepted by the scheduler.
///
/// Carries the resolved id, identity key and arrival sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub(crate) id: ModalId,
    pub(crate) kind: String,
    pub(crate) class: PriorityClass,
    pub(crate) identity_key: String,
    pub(crate) closable: bool,
    pub(crate) auto_close_after: Option<Duration>,
    pub(crate) layer_weight: i32,
    pub(crate) submitted_at: u64,
}

impl Submission {
    pub(crate) fn resolve(
        request: ModalRequest,
        id: ModalId,
        submitted_at: u64,
        max_layer_weight: i32,
    ) -> Self {
        let class = PriorityClass::classify(&request.kind);
        let identity_key = match request.identity_key {
            Some(key) => key,
            None if request.concurrent => format!("{}#{}", request.kind.trim(), id.id()),
            None => request.kind.trim().to_string(),
        };
        let bound = max_layer_weight.max(0);
        Self {
            id,
            kind: request.kind,
            class,
            identity_key,
            closable: request.closable,
            auto_close_after: request.auto_close_after,
            layer_weight: request.layer_weight.clamp(-bound, bound),
            submitted_at,
        }
    }

    /// Resolved identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ModalId {
        self.id
    }

    /// Declared kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Priority class.
    #[inline]
    #[must_use]
    pub fn class(&self) -> PriorityClass {
        self.class
    }

    /// Deduplication key.
    #[must_use]
    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    /// Whether the user may dismiss it.
    #[inline]
    #[must_use]
    pub fn is_closable(&self) -> bool {
        self.closable
    }

    /// Explicit auto-close lifetime, if the request set one.
    #[must_use]
    pub fn auto_close_after(&self) -> Option<Duration> {
        self.auto_close_after
    }

    /// Clamped layer weight.
    #[inline]
    #[must_use]
    pub fn layer_weight(&self) -> i32 {
        self.layer_weight
    }

    /// Logical arrival sequence.
    #[inline]
    #[must_use]
    pub fn submitted_at(&self) -> u64 {
        self.submitted_at
    }
}
