#![forbid(unsafe_code)]

//! Modal presentation scheduling for FrankenTUI.
//!
//! Many parts of an application want to put a dialog in front of the user at
//! once. The [`Scheduler`] decides which of them is visible, in what stacking
//! order, and which must wait:
//!
//! - [`PriorityClass`] maps a request's declared kind onto one of five fixed
//!   classes (critical, blocking, attention, notification, toast).
//! - [`SuppressionPolicy`] holds back whole classes while an
//!   [`ApplicationMode`] such as a tutorial is active.
//! - [`RequestQueue`] keeps waiting requests sorted by class and arrival.
//! - [`PresentationStack`] holds admitted instances, enforces identity
//!   uniqueness and computes layer indices.
//! - [`ModalHandle`] is the one-shot result every submitter gets back.
//!
//! # Example
//!
//! ```
//! use ftui_modal::{ApplicationMode, ModalOutcome, ModalRequest, Scheduler};
//!
//! let mut modals = Scheduler::default();
//! modals.set_mode(Some(ApplicationMode::Tutorial));
//!
//! let mut hint = modals.submit(ModalRequest::new("attention")).unwrap();
//! assert!(modals.stack().is_empty());
//!
//! modals.set_mode(None);
//! assert_eq!(modals.foreground().map(|m| m.id()), Some(hint.id()));
//!
//! modals.close_all();
//! assert_eq!(hint.try_outcome(), Some(ModalOutcome::ForceClosed));
//! ```

pub mod config;
pub mod error;
pub mod mode;
pub mod outcome;
pub mod priority;
pub mod queue;
pub mod request;
pub mod scheduler;
pub mod snapshot;
pub mod stack;
mod timer;

pub use config::SchedulerConfig;
#[cfg(feature = "policy-config")]
pub use config::PolicyFile;
pub use error::{ConfigError, SubmitError};
pub use mode::{ApplicationMode, ModeParseError, SuppressionPolicy};
pub use outcome::{ModalHandle, ModalOutcome, ModalResultData};
pub use priority::{ClassSet, PriorityClass};
pub use queue::RequestQueue;
pub use request::{ModalId, ModalRequest, Submission};
pub use scheduler::{RequestStatus, Scheduler};
pub use snapshot::{InstanceDescriptor, StackSnapshot, StackSubscription};
pub use stack::{InstancePhase, Layering, ModalInstance, PresentationStack};

/// Re-exported so hosts can drive [`Scheduler::tick`] without depending on
/// `web-time` themselves.
pub use web_time::Instant;
