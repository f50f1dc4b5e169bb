//! Timeline State Library
//!
//! This crate provides state reconciliation for the daily Timeline puzzle,
//! where a player orders historical events and receives hints along the way.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Game State Derivation** - Merges puzzle data, authentication, server
//!   progress and the local session into one of six game states.
//!
//! - **Ordering Resolution** - Produces a valid event ordering that honors
//!   every anchor hint, whatever the preferred ordering looks like.
//!
//! - **Hint Merging** - Deduplicates server and session hints by structural key.
//!
//! - **Progress Sync** - Detects and merges conflicting progress between two
//!   devices.
//!
//! # Design Principles
//!
//! 1. **Pure functions over values** - No locks, no shared mutable state, no I/O.
//!    Call the deriver as often as inputs change and drop stale results.
//!
//! 2. **Total at the edge** - `derive` never fails; failures become an `Error`
//!    state the renderer shows as "could not load".
//!
//! 3. **Closed sum types** - Hints and game states are enums matched
//!    exhaustively.
//!
//! 4. **Serialization-ready** - All types round-trip through JSON.
//!
//! # Example
//!
//! ```rust
//! use timeline_state::state::{merge_hints, resolve_ordering, Hint};
//!
//! let server = vec![Hint::anchor("b", 2)];
//! let session = vec![Hint::anchor("b", 2), Hint::relative("a", "c")];
//! let hints = merge_hints(&server, &session);
//! assert_eq!(hints.len(), 2);
//!
//! let baseline: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
//! let preferred: Vec<String> = vec!["b".into(), "a".into(), "c".into()];
//! let order = resolve_ordering(&baseline, &preferred, &hints).unwrap();
//! assert_eq!(order, ["a", "c", "b"]);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
