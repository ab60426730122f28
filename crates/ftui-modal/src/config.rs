#![forbid(unsafe_code)]

//! Scheduler configuration.
//!
//! [`SchedulerConfig`] collects the layering constants, class lifetimes, exit
//! transition length and suppression table. Everything has a default; the
//! builder methods override individual values.
//!
//! With the `policy-config` feature, the same values can be loaded from a
//! TOML or JSON policy file:
//!
//! ```toml
//! base_layer = 2000
//! toast_lifetime_ms = 1500
//! exit_transition_ms = 150
//! critical_escapes_teardown = true
//!
//! [suppress]
//! guided-input = ["toast"]
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::mode::{ApplicationMode, SuppressionPolicy};
use crate::priority::{ClassSet, PriorityClass};
use crate::stack::Layering;

/// Configuration for a [`Scheduler`](crate::Scheduler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Layer index computation.
    pub layering: Layering,
    /// Lifetime for notifications without an explicit one.
    pub notification_lifetime: Duration,
    /// Lifetime for toasts without an explicit one.
    pub toast_lifetime: Duration,
    /// How long a closing instance keeps its slot. Zero, or a length the
    /// clock cannot represent, closes synchronously.
    pub exit_transition: Duration,
    /// Mode-dependent admission suppression.
    pub suppression: SuppressionPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            layering: Layering::default(),
            notification_lifetime: PriorityClass::Notification
                .default_lifetime()
                .unwrap_or_default(),
            toast_lifetime: PriorityClass::Toast.default_lifetime().unwrap_or_default(),
            exit_transition: Duration::ZERO,
            suppression: SuppressionPolicy::new(),
        }
    }
}

impl SchedulerConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base layer.
    #[must_use]
    pub fn base_layer(mut self, base: u32) -> Self {
        self.layering.base = base;
        self
    }

    /// Set the layer increment between stack positions.
    #[must_use]
    pub fn stack_increment(mut self, increment: u32) -> Self {
        self.layering.stack_increment = increment;
        self
    }

    /// Set the layer distance between priority classes.
    #[must_use]
    pub fn class_band(mut self, band: u32) -> Self {
        self.layering.class_band = band;
        self
    }

    /// Set the layer weight clamp.
    #[must_use]
    pub fn max_layer_weight(mut self, weight: i32) -> Self {
        self.layering.max_weight = weight;
        self
    }

    /// Set the default notification lifetime.
    #[must_use]
    pub fn notification_lifetime(mut self, lifetime: Duration) -> Self {
        self.notification_lifetime = lifetime;
        self
    }

    /// Set the default toast lifetime.
    #[must_use]
    pub fn toast_lifetime(mut self, lifetime: Duration) -> Self {
        self.toast_lifetime = lifetime;
        self
    }

    /// Set the exit transition length.
    #[must_use]
    pub fn exit_transition(mut self, duration: Duration) -> Self {
        self.exit_transition = duration;
        self
    }

    /// Let critical requests through every mode, teardown included.
    #[must_use]
    pub fn critical_escapes_teardown(mut self, escapes: bool) -> Self {
        self.suppression = self.suppression.with_critical_escapable(escapes);
        self
    }

    /// Replace the suppressed set for one mode.
    #[must_use]
    pub fn suppress(mut self, mode: ApplicationMode, classes: ClassSet) -> Self {
        self.suppression = self.suppression.with_mode(mode, classes);
        self
    }

    /// Lifetime an instance of `class` gets when the request sets none.
    #[must_use]
    pub fn lifetime_for(&self, class: PriorityClass) -> Option<Duration> {
        match class {
            PriorityClass::Notification => Some(self.notification_lifetime),
            PriorityClass::Toast => Some(self.toast_lifetime),
            PriorityClass::Critical | PriorityClass::Blocking | PriorityClass::Attention => None,
        }
    }

    /// Check the layering constants.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when the stack increment is zero or the weight
    /// range could reorder layers across classes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layering.stack_increment == 0 {
            return Err(ConfigError::Invalid(
                "stack_increment must be at least 1".into(),
            ));
        }
        if !self.layering.is_monotonic() {
            return Err(ConfigError::Invalid(format!(
                "max_layer_weight {} must be non-negative and below half of class_band {}",
                self.layering.max_weight, self.layering.class_band
            )));
        }
        Ok(())
    }
}

#[cfg(feature = "policy-config")]
mod policy_file {
    use std::collections::HashMap;
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    use super::SchedulerConfig;
    use crate::error::ConfigError;
    use crate::mode::ApplicationMode;
    use crate::priority::PriorityClass;

    /// On-disk policy. Absent keys keep their defaults.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    pub struct PolicyFile {
        /// Layer of the bottom-most slot.
        pub base_layer: Option<u32>,
        /// Layer step between stack positions.
        pub stack_increment: Option<u32>,
        /// Layer distance between priority classes.
        pub class_band: Option<u32>,
        /// Layer weight clamp.
        pub max_layer_weight: Option<i32>,
        /// Default notification lifetime in milliseconds.
        pub notification_lifetime_ms: Option<u64>,
        /// Default toast lifetime in milliseconds.
        pub toast_lifetime_ms: Option<u64>,
        /// Exit transition length in milliseconds.
        pub exit_transition_ms: Option<u64>,
        /// Let critical requests through teardown.
        pub critical_escapes_teardown: Option<bool>,
        /// Per-mode suppressed classes, replacing the defaults.
        pub suppress: HashMap<ApplicationMode, Vec<PriorityClass>>,
    }

    impl PolicyFile {
        /// Overlay this policy on `config`.
        #[must_use]
        pub fn apply(self, mut config: SchedulerConfig) -> SchedulerConfig {
            if let Some(v) = self.base_layer {
                config = config.base_layer(v);
            }
            if let Some(v) = self.stack_increment {
                config = config.stack_increment(v);
            }
            if let Some(v) = self.class_band {
                config = config.class_band(v);
            }
            if let Some(v) = self.max_layer_weight {
                config = config.max_layer_weight(v);
            }
            if let Some(ms) = self.notification_lifetime_ms {
                config = config.notification_lifetime(Duration::from_millis(ms));
            }
            if let Some(ms) = self.toast_lifetime_ms {
                config = config.toast_lifetime(Duration::from_millis(ms));
            }
            if let Some(ms) = self.exit_transition_ms {
                config = config.exit_transition(Duration::from_millis(ms));
            }
            if let Some(escapes) = self.critical_escapes_teardown {
                config = config.critical_escapes_teardown(escapes);
            }
            for (mode, classes) in self.suppress {
                config = config.suppress(mode, classes.into_iter().collect());
            }
            config
        }
    }

    impl SchedulerConfig {
        /// Load a policy from TOML, on top of the defaults.
        ///
        /// # Errors
        ///
        /// [`ConfigError::Parse`] on malformed input, [`ConfigError::Invalid`]
        /// when the resulting layering is unusable.
        pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
            let file: PolicyFile =
                toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
            let config = file.apply(Self::default());
            config.validate()?;
            Ok(config)
        }

        /// Load a policy from JSON, on top of the defaults.
        ///
        /// # Errors
        ///
        /// Same as [`from_toml_str`](Self::from_toml_str).
        pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
            let file: PolicyFile =
                serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
            let config = file.apply(Self::default());
            config.validate()?;
            Ok(config)
        }
    }
}

#[cfg(feature = "policy-config")]
pub use policy_file::PolicyFile;
