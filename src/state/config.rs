//! Resolution policy.
//!
//! Only anchor hints are known to move events. Whether relative hints do, and
//! what happens when anchors disagree, are product decisions carried here so
//! callers choose them explicitly.

use serde::{Deserialize, Serialize};

/// How relative hints take part in resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativePolicy {
    /// Shown to the player, never moves an event.
    #[default]
    Advisory,
    /// Non-anchored events are reordered to satisfy relative hints.
    Enforce,
}

/// What to do when two anchors disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorConflictPolicy {
    /// Fail resolution with a `ResolveError`.
    #[default]
    Reject,
    /// The later hint in array order wins.
    LastWins,
}

impl AnchorConflictPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::LastWins => "last_wins",
        }
    }
}

/// Resolver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverPolicy {
    pub relative: RelativePolicy,
    pub anchor_conflict: AnchorConflictPolicy,
}

impl ResolverPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relative(mut self, relative: RelativePolicy) -> Self {
        self.relative = relative;
        self
    }

    pub fn with_anchor_conflict(mut self, anchor_conflict: AnchorConflictPolicy) -> Self {
        self.anchor_conflict = anchor_conflict;
        self
    }

    /// Parse a policy from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid resolver policy: {0}")]
    Json(#[from] serde_json::Error),
}
