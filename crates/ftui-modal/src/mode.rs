#![forbid(unsafe_code)]

//! Application modes and the suppression policy.
//!
//! The application carries at most one [`ApplicationMode`] at a time. While a
//! mode is active, the [`SuppressionPolicy`] names the priority classes that
//! must not be admitted. Suppressed requests wait in the queue; they are never
//! canceled by suppression alone.
//!
//! # Default table
//!
//! | Mode | Suppressed |
//! |------|------------|
//! | none | nothing |
//! | `tutorial` | attention, notification, toast |
//! | `guided-input` | notification, toast |
//! | `teardown` | everything, critical included |
//!
//! Teardown silencing critical requests is intentional: a hard-reset flow must
//! be able to finish without any dialog reappearing. Callers that need critical
//! requests to always get through use
//! [`SuppressionPolicy::with_critical_escapable`].

use std::fmt;
use std::str::FromStr;

use crate::priority::{ClassSet, PriorityClass};

/// Process-wide application mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "policy-config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "policy-config", serde(rename_all = "kebab-case"))]
pub enum ApplicationMode {
    /// A scripted walkthrough owns the screen.
    Tutorial,
    /// The user is typing or picking something and must not be interrupted.
    GuidedInput,
    /// The application is resetting or shutting down.
    Teardown,
}

impl ApplicationMode {
    /// All modes.
    pub const ALL: [ApplicationMode; 3] = [
        ApplicationMode::Tutorial,
        ApplicationMode::GuidedInput,
        ApplicationMode::Teardown,
    ];

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tutorial => "tutorial",
            Self::GuidedInput => "guided-input",
            Self::Teardown => "teardown",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Tutorial => 0,
            Self::GuidedInput => 1,
            Self::Teardown => 2,
        }
    }
}

impl fmt::Display for ApplicationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a mode name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application mode: {0:?}")]
pub struct ModeParseError(pub String);

impl FromStr for ApplicationMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ModeParseError(s.to_string()))
    }
}

/// Per-mode table of suppressed priority classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressionPolicy {
    table: [ClassSet; 3],
    critical_escapable: bool,
}

impl Default for SuppressionPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl SuppressionPolicy {
    /// The built-in table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: [
                // tutorial
                ClassSet::ATTENTION
                    .union(ClassSet::NOTIFICATION)
                    .union(ClassSet::TOAST),
                // guided-input
                ClassSet::NOTIFICATION.union(ClassSet::TOAST),
                // teardown
                ClassSet::all(),
            ],
            critical_escapable: false,
        }
    }

    /// Replace the suppressed set for one mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ApplicationMode, suppressed: ClassSet) -> Self {
        self.table[mode.index()] = suppressed;
        self
    }

    /// Never suppress critical requests, whatever the mode says.
    #[must_use]
    pub fn with_critical_escapable(mut self, escapable: bool) -> Self {
        self.critical_escapable = escapable;
        self
    }

    /// Whether critical requests bypass every mode.
    #[inline]
    #[must_use]
    pub const fn critical_escapable(&self) -> bool {
        self.critical_escapable
    }

    /// Classes that must not be admitted under `mode`.
    #[must_use]
    pub fn suppressed(&self, mode: Option<ApplicationMode>) -> ClassSet {
        let Some(mode) = mode else {
            return ClassSet::empty();
        };
        let set = self.table[mode.index()];
        if self.critical_escapable {
            set.difference(ClassSet::CRITICAL)
        } else {
            set
        }
    }

    /// Whether `class` must wait under `mode`.
    #[inline]
    #[must_use]
    pub fn is_suppressed(&self, class: PriorityClass, mode: Option<ApplicationMode>) -> bool {
        self.suppressed(mode).has(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_mode_suppresses_nothing() {
        let policy = SuppressionPolicy::new();
        for class in PriorityClass::ALL {
            assert!(!policy.is_suppressed(class, None));
        }
    }

    #[test]
    fn tutorial_suppresses_attention_and_below() {
        let policy = SuppressionPolicy::new();
        let mode = Some(ApplicationMode::Tutorial);
        assert!(!policy.is_suppressed(PriorityClass::Critical, mode));
        assert!(!policy.is_suppressed(PriorityClass::Blocking, mode));
        assert!(policy.is_suppressed(PriorityClass::Attention, mode));
        assert!(policy.is_suppressed(PriorityClass::Notification, mode));
        assert!(policy.is_suppressed(PriorityClass::Toast, mode));
    }

    #[test]
    fn guided_input_only_silences_passive_classes() {
        let policy = SuppressionPolicy::new();
        let mode = Some(ApplicationMode::GuidedInput);
        assert!(!policy.is_suppressed(PriorityClass::Attention, mode));
        assert!(policy.is_suppressed(PriorityClass::Notification, mode));
        assert!(policy.is_suppressed(PriorityClass::Toast, mode));
    }

    #[test]
    fn teardown_suppresses_critical() {
        let policy = SuppressionPolicy::new();
        assert_eq!(
            policy.suppressed(Some(ApplicationMode::Teardown)),
            ClassSet::all()
        );
    }

    #[test]
    fn critical_escape_override() {
        let policy = SuppressionPolicy::new().with_critical_escapable(true);
        let mode = Some(ApplicationMode::Teardown);
        assert!(!policy.is_suppressed(PriorityClass::Critical, mode));
        assert!(policy.is_suppressed(PriorityClass::Blocking, mode));
    }

    #[test]
    fn per_mode_override_replaces_set() {
        let policy =
            SuppressionPolicy::new().with_mode(ApplicationMode::GuidedInput, ClassSet::TOAST);
        let mode = Some(ApplicationMode::GuidedInput);
        assert!(!policy.is_suppressed(PriorityClass::Notification, mode));
        assert!(policy.is_suppressed(PriorityClass::Toast, mode));
        // Other modes untouched.
        assert!(policy.is_suppressed(PriorityClass::Attention, Some(ApplicationMode::Tutorial)));
    }

    #[test]
    fn mode_names_round_trip() {
        for mode in ApplicationMode::ALL {
            assert_eq!(mode.name().parse::<ApplicationMode>(), Ok(mode));
        }
        assert_eq!(
            " Guided-Input ".parse::<ApplicationMode>(),
            Ok(ApplicationMode::GuidedInput)
        );
        assert_eq!(
            "party".parse::<ApplicationMode>(),
            Err(ModeParseError("party".into()))
        );
    }
}
