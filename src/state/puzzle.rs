//! Puzzle catalog and progress records.
//!
//! These are read-only inputs to the core. A puzzle's `events` sequence is the
//! baseline ordering and the complete identifier set for every resolution.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::hint::Hint;

/// A single historical event to be placed on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    /// Negative for BCE.
    pub year: i32,
    pub text: String,
}

impl Event {
    pub fn new(id: impl Into<String>, year: i32, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            year,
            text: text.into(),
        }
    }
}

/// A daily puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: String,
    pub date: NaiveDate,
    pub puzzle_number: u32,
    pub seed: u64,
    /// Catalog order, not chronological order.
    pub events: Vec<Event>,
}

impl Puzzle {
    /// Event identifiers in catalog order.
    pub fn baseline_order(&self) -> Vec<String> {
        self.events.iter().map(|e| e.id.clone()).collect()
    }

    /// Look up an event by identifier.
    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Ground-truth ordering: events ascending by year, ties kept in catalog order.
pub fn correct_order(puzzle: &Puzzle) -> Vec<String> {
    let mut events: Vec<&Event> = puzzle.events.iter().collect();
    // sort_by_key is stable
    events.sort_by_key(|e| e.year);
    events.into_iter().map(|e| e.id.clone()).collect()
}

/// Final score for a completed attempt. Opaque to the core; only forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub total_score: u32,
    pub correct_pairs: u32,
    pub total_pairs: u32,
    pub perfect_positions: u32,
    pub hints_used: u32,
}

/// Local progress for an anonymous player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub ordering: Vec<String>,
    pub hints: Vec<Hint>,
    pub committed_at: Option<DateTime<Utc>>,
    pub score: Option<Score>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the player has committed a final answer.
    pub fn is_committed(&self) -> bool {
        self.committed_at.is_some()
    }
}

/// Server-persisted progress for an authenticated player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    pub ordering: Vec<String>,
    pub hints: Vec<Hint>,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: Option<Score>,
}

impl ProgressData {
    /// Check if the server has recorded a completion.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}
