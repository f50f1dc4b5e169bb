//! State reconciliation module for Timeline.
//!
//! This module provides the core value types and pure functions:
//!
//! - `puzzle` - Puzzle catalog, score and progress records
//! - `hint` - Hint model and hint merging
//! - `config` - Resolver policy
//! - `ordering` - Ordering resolution under anchor (and optionally relative) hints
//! - `game` - Game state derivation
//! - `sync` - Cross-device progress sync
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ ┌──────────────┐ ┌────────────────┐ ┌──────────────┐
//! │ PuzzleSource │ │  AuthSource  │ │ ProgressSource │ │ SessionState │
//! └──────┬───────┘ └──────┬───────┘ └───────┬────────┘ └──────┬───────┘
//!        └────────────────┴────────┬────────┴─────────────────┘
//!                                  ▼
//!                      ┌───────────────────────┐
//!                      │   GameStateDeriver    │
//!                      │                       │
//!                      │  merge_hints ──┐      │
//!                      │                ▼      │
//!                      │  OrderingResolver     │
//!                      └───────────┬───────────┘
//!                                  ▼
//!   LoadingPuzzle │ LoadingAuth │ LoadingProgress │ Ready │ Completed │ Error
//!
//!
//!   SyncData (local) ──┐
//!                      ├──▶ reconcile ──▶ SyncOutcome
//!   SyncData (remote) ─┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use timeline_state::state::{
//!     derive_game_state, AuthSource, Event, GameState, Hint, ProgressSource, Puzzle,
//!     PuzzleSource, SessionState,
//! };
//!
//! let puzzle = Puzzle {
//!     id: "2026-10-19".to_string(),
//!     date: chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
//!     puzzle_number: 1,
//!     seed: 7,
//!     events: vec![
//!         Event::new("a", 1200, "A"),
//!         Event::new("b", 1300, "B"),
//!         Event::new("c", 1400, "C"),
//!     ],
//! };
//! let session = SessionState {
//!     ordering: vec!["b".into(), "a".into(), "c".into()],
//!     hints: vec![Hint::anchor("b", 2)],
//!     ..SessionState::default()
//! };
//!
//! let state = derive_game_state(
//!     &PuzzleSource::loaded(puzzle),
//!     &AuthSource::anonymous(),
//!     &ProgressSource::empty(),
//!     &session,
//! );
//! assert_eq!(state.order().unwrap(), ["a", "c", "b"]);
//! ```

pub mod config;
pub mod game;
pub mod hint;
pub mod ordering;
pub mod puzzle;
pub mod sync;

// Re-export commonly used types
pub use config::{AnchorConflictPolicy, ConfigError, RelativePolicy, ResolverPolicy};
pub use game::{
    derive_game_state, AuthSource, DeriveError, GameState, GameStateDeriver, ProgressSource,
    PuzzleSource,
};
pub use hint::{bracket_annotations, merge_hints, Hint, HintKey, YearRange};
pub use ordering::{resolve_ordering, OrderingResolver, ResolveError};
pub use puzzle::{correct_order, Event, ProgressData, Puzzle, Score, SessionState};
pub use sync::{
    detect_sync_conflict, merge_game_states, reconcile, SyncData, SyncError, SyncOutcome,
    SyncableGameState, SYNC_FORMAT_VERSION,
};
