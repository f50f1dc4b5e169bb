//! Hints and hint merging.
//!
//! A hint is an irrevocable constraint revealed during an attempt. Hints are
//! append-only: merging two hint lists never drops a hint that either side
//! already holds, it only collapses structural duplicates.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::puzzle::{correct_order, Puzzle};

/// Inclusive year window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }

    /// Width of the window in years.
    pub fn span(&self) -> i64 {
        i64::from(self.max) - i64::from(self.min)
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// A constraint revealed to the player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Hint {
    /// Event must occupy this zero-based slot.
    #[serde(rename_all = "camelCase")]
    Anchor { event_id: String, position: usize },

    /// `earlier_event_id` must precede `later_event_id`.
    #[serde(rename_all = "camelCase")]
    Relative {
        earlier_event_id: String,
        later_event_id: String,
    },

    /// Event's true year lies within the range. Display only.
    #[serde(rename_all = "camelCase")]
    Bracket {
        event_id: String,
        year_range: YearRange,
    },
}

impl Hint {
    pub fn anchor(event_id: impl Into<String>, position: usize) -> Self {
        Self::Anchor {
            event_id: event_id.into(),
            position,
        }
    }

    pub fn relative(earlier: impl Into<String>, later: impl Into<String>) -> Self {
        Self::Relative {
            earlier_event_id: earlier.into(),
            later_event_id: later.into(),
        }
    }

    pub fn bracket(event_id: impl Into<String>, min: i32, max: i32) -> Self {
        Self::Bracket {
            event_id: event_id.into(),
            year_range: YearRange::new(min, max),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Anchor { .. } => "anchor",
            Self::Relative { .. } => "relative",
            Self::Bracket { .. } => "bracket",
        }
    }

    /// Structural identity used for deduplication.
    pub fn key(&self) -> HintKey<'_> {
        match self {
            Self::Anchor { event_id, position } => HintKey::Anchor(event_id, *position),
            Self::Relative {
                earlier_event_id,
                later_event_id,
            } => HintKey::Relative(earlier_event_id, later_event_id),
            Self::Bracket {
                event_id,
                year_range,
            } => HintKey::Bracket(event_id, *year_range),
        }
    }

    /// Event identifiers this hint mentions.
    pub fn event_ids(&self) -> Vec<&str> {
        match self {
            Self::Anchor { event_id, .. } | Self::Bracket { event_id, .. } => {
                vec![event_id.as_str()]
            }
            Self::Relative {
                earlier_event_id,
                later_event_id,
            } => vec![earlier_event_id.as_str(), later_event_id.as_str()],
        }
    }

    /// Check whether the hint is true of the puzzle's ground truth.
    ///
    /// Used to catch authoring mistakes; a hint naming an unknown event is
    /// never consistent.
    pub fn is_consistent_with(&self, puzzle: &Puzzle) -> bool {
        match self {
            Self::Anchor { event_id, position } => correct_order(puzzle)
                .get(*position)
                .is_some_and(|id| id == event_id),
            Self::Relative {
                earlier_event_id,
                later_event_id,
            } => {
                let truth = correct_order(puzzle);
                let earlier = truth.iter().position(|id| id == earlier_event_id);
                let later = truth.iter().position(|id| id == later_event_id);
                matches!((earlier, later), (Some(e), Some(l)) if e < l)
            }
            Self::Bracket {
                event_id,
                year_range,
            } => puzzle
                .event(event_id)
                .is_some_and(|e| year_range.contains(e.year)),
        }
    }
}

/// Structural key of a hint.
///
/// Formats as `anchor:{id}:{pos}`, `relative:{earlier}:{later}` or
/// `bracket:{id}:{min}-{max}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HintKey<'a> {
    Anchor(&'a str, usize),
    Relative(&'a str, &'a str),
    Bracket(&'a str, YearRange),
}

impl fmt::Display for HintKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anchor(id, pos) => write!(f, "anchor:{}:{}", id, pos),
            Self::Relative(earlier, later) => write!(f, "relative:{}:{}", earlier, later),
            Self::Bracket(id, range) => write!(f, "bracket:{}:{}", id, range),
        }
    }
}

/// Merge server and session hints into one canonical list.
///
/// Server hints come first in their original order, followed by session hints
/// whose structural key has not been seen. The first occurrence of a key wins.
pub fn merge_hints(server: &[Hint], session: &[Hint]) -> Vec<Hint> {
    let mut seen: HashSet<HintKey<'_>> = HashSet::with_capacity(server.len() + session.len());
    let mut merged = Vec::with_capacity(server.len() + session.len());

    for hint in server.iter().chain(session) {
        if seen.insert(hint.key()) {
            merged.push(hint.clone());
        }
    }

    merged
}

/// Year windows to show next to events, keyed by event ID.
///
/// When an event has several brackets the narrowest wins; ties keep the
/// earlier hint.
pub fn bracket_annotations(hints: &[Hint]) -> BTreeMap<String, YearRange> {
    let mut annotations: BTreeMap<String, YearRange> = BTreeMap::new();

    for hint in hints {
        if let Hint::Bracket {
            event_id,
            year_range,
        } = hint
        {
            match annotations.get(event_id) {
                Some(existing) if existing.span() <= year_range.span() => {}
                _ => {
                    annotations.insert(event_id.clone(), *year_range);
                }
            }
        }
    }

    annotations
}
