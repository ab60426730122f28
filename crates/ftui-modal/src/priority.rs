#![forbid(unsafe_code)]

//! Priority classes and the kind classifier.
//!
//! Every modal request declares a free-form `kind` string. The classifier maps
//! it onto one of five fixed [`PriorityClass`] variants, which fix admission
//! precedence and default auto-close behavior.
//!
//! # Invariants
//!
//! - Priority ordering is total and fixed: `Critical < Blocking < Attention <
//!   Notification < Toast` (lower value is admitted first).
//! - Only `Critical` and `Blocking` block lower classes.
//! - `Critical` and `Blocking` never auto-close unless the request asks for it.
//!
//! # Failure Modes
//!
//! None. Unknown kinds resolve to [`PriorityClass::Attention`].

use std::fmt;
use std::time::Duration;

use bitflags::bitflags;

/// Default lifetime for [`PriorityClass::Notification`].
pub const NOTIFICATION_LIFETIME: Duration = Duration::from_secs(6);

/// Default lifetime for [`PriorityClass::Toast`].
pub const TOAST_LIFETIME: Duration = Duration::from_secs(3);

/// One of the five fixed priority classes.
///
/// Ordering follows admission precedence: `Critical` compares smallest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "policy-config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "policy-config", serde(rename_all = "kebab-case"))]
pub enum PriorityClass {
    /// Must be seen; sits above everything else.
    Critical,
    /// Requires an answer before lower classes may appear.
    Blocking,
    /// Ordinary dialog. Also the fallback for unknown kinds.
    Attention,
    /// Informational, dismisses itself after a while.
    Notification,
    /// Short-lived flash message.
    Toast,
}

impl PriorityClass {
    /// All classes in admission order.
    pub const ALL: [PriorityClass; 5] = [
        PriorityClass::Critical,
        PriorityClass::Blocking,
        PriorityClass::Attention,
        PriorityClass::Notification,
        PriorityClass::Toast,
    ];

    /// Map a declared request kind onto its class.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Unknown kinds fall back to [`PriorityClass::Attention`].
    #[must_use]
    pub fn classify(kind: &str) -> Self {
        let kind = kind.trim();
        for (alias, class) in KIND_ALIASES {
            if kind.eq_ignore_ascii_case(alias) {
                return *class;
            }
        }
        Self::Attention
    }

    /// Numeric priority, 0 being the highest.
    #[inline]
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Blocking => 1,
            Self::Attention => 2,
            Self::Notification => 3,
            Self::Toast => 4,
        }
    }

    /// Inverse of [`priority`](Self::priority): higher means closer to the top of the stack.
    #[inline]
    #[must_use]
    pub const fn importance(self) -> u8 {
        4 - self.priority()
    }

    /// Whether an admitted instance of this class keeps lower classes waiting.
    #[inline]
    #[must_use]
    pub const fn blocks_lower_classes(self) -> bool {
        matches!(self, Self::Critical | Self::Blocking)
    }

    /// Whether instances of this class dismiss themselves by default.
    #[inline]
    #[must_use]
    pub const fn auto_closes(self) -> bool {
        matches!(self, Self::Notification | Self::Toast)
    }

    /// Built-in lifetime for auto-closing classes.
    #[must_use]
    pub const fn default_lifetime(self) -> Option<Duration> {
        match self {
            Self::Notification => Some(NOTIFICATION_LIFETIME),
            Self::Toast => Some(TOAST_LIFETIME),
            Self::Critical | Self::Blocking | Self::Attention => None,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Blocking => "blocking",
            Self::Attention => "attention",
            Self::Notification => "notification",
            Self::Toast => "toast",
        }
    }

    /// The single-member set for this class.
    #[inline]
    #[must_use]
    pub const fn as_set(self) -> ClassSet {
        match self {
            Self::Critical => ClassSet::CRITICAL,
            Self::Blocking => ClassSet::BLOCKING,
            Self::Attention => ClassSet::ATTENTION,
            Self::Notification => ClassSet::NOTIFICATION,
            Self::Toast => ClassSet::TOAST,
        }
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const KIND_ALIASES: &[(&str, PriorityClass)] = &[
    ("critical", PriorityClass::Critical),
    ("fatal", PriorityClass::Critical),
    ("error", PriorityClass::Critical),
    ("blocking", PriorityClass::Blocking),
    ("confirm", PriorityClass::Blocking),
    ("prompt", PriorityClass::Blocking),
    ("attention", PriorityClass::Attention),
    ("dialog", PriorityClass::Attention),
    ("info", PriorityClass::Attention),
    ("notification", PriorityClass::Notification),
    ("notice", PriorityClass::Notification),
    ("toast", PriorityClass::Toast),
    ("flash", PriorityClass::Toast),
];

bitflags! {
    /// A set of priority classes, used by suppression tables.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassSet: u8 {
        const CRITICAL = 1 << 0;
        const BLOCKING = 1 << 1;
        const ATTENTION = 1 << 2;
        const NOTIFICATION = 1 << 3;
        const TOAST = 1 << 4;
    }
}

impl ClassSet {
    /// Whether `class` is a member.
    #[inline]
    #[must_use]
    pub const fn has(self, class: PriorityClass) -> bool {
        self.contains(class.as_set())
    }

    /// Members in admission order.
    pub fn classes(self) -> impl Iterator<Item = PriorityClass> {
        PriorityClass::ALL.into_iter().filter(move |c| self.has(*c))
    }
}

impl FromIterator<PriorityClass> for ClassSet {
    fn from_iter<I: IntoIterator<Item = PriorityClass>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ClassSet::empty(), |set, class| set | class.as_set())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_classify() {
        assert_eq!(PriorityClass::classify("critical"), PriorityClass::Critical);
        assert_eq!(PriorityClass::classify("blocking"), PriorityClass::Blocking);
        assert_eq!(PriorityClass::classify("attention"), PriorityClass::Attention);
        assert_eq!(
            PriorityClass::classify("notification"),
            PriorityClass::Notification
        );
        assert_eq!(PriorityClass::classify("toast"), PriorityClass::Toast);
    }

    #[test]
    fn aliases_are_case_insensitive() {
        assert_eq!(PriorityClass::classify("  Confirm "), PriorityClass::Blocking);
        assert_eq!(PriorityClass::classify("FATAL"), PriorityClass::Critical);
        assert_eq!(PriorityClass::classify("Flash"), PriorityClass::Toast);
    }

    #[test]
    fn unknown_kind_falls_back_to_attention() {
        assert_eq!(PriorityClass::classify("settings"), PriorityClass::Attention);
        assert_eq!(PriorityClass::classify(""), PriorityClass::Attention);
    }

    #[test]
    fn ordering_is_total_and_fixed() {
        let mut shuffled = [
            PriorityClass::Toast,
            PriorityClass::Critical,
            PriorityClass::Notification,
            PriorityClass::Blocking,
            PriorityClass::Attention,
        ];
        shuffled.sort();
        assert_eq!(shuffled, PriorityClass::ALL);
        for (i, class) in PriorityClass::ALL.iter().enumerate() {
            assert_eq!(class.priority() as usize, i);
        }
    }

    #[test]
    fn only_top_classes_block() {
        let blocking: Vec<_> = PriorityClass::ALL
            .into_iter()
            .filter(|c| c.blocks_lower_classes())
            .collect();
        assert_eq!(blocking, vec![PriorityClass::Critical, PriorityClass::Blocking]);
    }

    #[test]
    fn blocking_classes_never_auto_close_by_default() {
        for class in [PriorityClass::Critical, PriorityClass::Blocking] {
            assert!(!class.auto_closes());
            assert!(class.default_lifetime().is_none());
        }
        assert_eq!(
            PriorityClass::Toast.default_lifetime(),
            Some(TOAST_LIFETIME)
        );
    }

    #[test]
    fn class_set_collects_and_iterates() {
        let set: ClassSet = [PriorityClass::Toast, PriorityClass::Attention]
            .into_iter()
            .collect();
        assert!(set.has(PriorityClass::Toast));
        assert!(!set.has(PriorityClass::Critical));
        let members: Vec<_> = set.classes().collect();
        assert_eq!(members, vec![PriorityClass::Attention, PriorityClass::Toast]);
        assert_eq!(ClassSet::all().classes().count(), 5);
    }
}
