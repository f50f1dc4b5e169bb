//! Game state derivation.
//!
//! Composes the puzzle, identity, server progress and local session into a
//! single [`GameState`] value. Derivation is pure and total: every failure is
//! folded into [`GameState::Error`], so the result can be rendered directly on
//! every input change.
//!
//! # Precedence
//!
//! ```text
//! puzzle loading ──▶ LoadingPuzzle
//! puzzle failed / absent ──▶ Error
//! auth loading ──▶ LoadingAuth
//! authenticated && progress loading ──▶ LoadingProgress
//! complete ──▶ Completed (or Error if no score)
//! otherwise ──▶ Ready
//! ```

use serde::{Deserialize, Serialize};

use super::config::ResolverPolicy;
use super::hint::{bracket_annotations, merge_hints, Hint};
use super::ordering::{OrderingResolver, ResolveError};
use super::puzzle::{correct_order, ProgressData, Puzzle, Score, SessionState};

/// Puzzle catalog input.
#[derive(Debug, Clone, Default)]
pub struct PuzzleSource {
    pub puzzle: Option<Puzzle>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl PuzzleSource {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn loaded(puzzle: Puzzle) -> Self {
        Self {
            puzzle: Some(puzzle),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Identity provider input.
#[derive(Debug, Clone, Default)]
pub struct AuthSource {
    pub user_id: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl AuthSource {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            is_authenticated: true,
            is_loading: false,
        }
    }
}

/// Remote progress input.
#[derive(Debug, Clone, Default)]
pub struct ProgressSource {
    pub progress: Option<ProgressData>,
    pub is_loading: bool,
}

impl ProgressSource {
    pub fn loading() -> Self {
        Self {
            progress: None,
            is_loading: true,
        }
    }

    pub fn loaded(progress: ProgressData) -> Self {
        Self {
            progress: Some(progress),
            is_loading: false,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// The single authoritative game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameState {
    LoadingPuzzle,
    LoadingAuth,
    LoadingProgress,

    /// Attempt in progress.
    #[serde(rename_all = "camelCase")]
    Ready {
        puzzle: Puzzle,
        current_order: Vec<String>,
        hints: Vec<Hint>,
    },

    /// Attempt committed and scored.
    #[serde(rename_all = "camelCase")]
    Completed {
        puzzle: Puzzle,
        final_order: Vec<String>,
        correct_order: Vec<String>,
        score: Score,
        hints: Vec<Hint>,
    },

    /// The puzzle cannot be shown.
    Error { message: String },
}

impl GameState {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LoadingPuzzle => "loading_puzzle",
            Self::LoadingAuth => "loading_auth",
            Self::LoadingProgress => "loading_progress",
            Self::Ready { .. } => "ready",
            Self::Completed { .. } => "completed",
            Self::Error { .. } => "error",
        }
    }

    /// Check if still waiting on an input.
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::LoadingPuzzle | Self::LoadingAuth | Self::LoadingProgress
        )
    }

    /// Check if the state cannot progress further for this attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Error { .. })
    }

    pub fn puzzle(&self) -> Option<&Puzzle> {
        match self {
            Self::Ready { puzzle, .. } | Self::Completed { puzzle, .. } => Some(puzzle),
            _ => None,
        }
    }

    pub fn hints(&self) -> &[Hint] {
        match self {
            Self::Ready { hints, .. } | Self::Completed { hints, .. } => hints,
            _ => &[],
        }
    }

    /// Current order while playing, final order once completed.
    pub fn order(&self) -> Option<&[String]> {
        match self {
            Self::Ready { current_order, .. } => Some(current_order),
            Self::Completed { final_order, .. } => Some(final_order),
            _ => None,
        }
    }

    /// Client display snapshot with bracket annotations resolved.
    ///
    /// Keys are camelCase like the serde form, but the shape is flattened
    /// under a `status` field and is not meant to be deserialized back.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({ "status": self.kind() });

        if let Some(puzzle) = self.puzzle() {
            obj["puzzleId"] = serde_json::json!(puzzle.id);
            obj["puzzleNumber"] = serde_json::json!(puzzle.puzzle_number);
        }
        if let Some(order) = self.order() {
            obj["order"] = serde_json::json!(order);
            obj["hints"] = serde_json::json!(self.hints());
            obj["annotations"] = serde_json::json!(bracket_annotations(self.hints()));
        }
        match self {
            Self::Completed {
                correct_order,
                score,
                ..
            } => {
                obj["correctOrder"] = serde_json::json!(correct_order);
                obj["score"] = serde_json::json!(score);
            }
            Self::Error { message } => {
                obj["message"] = serde_json::json!(message);
            }
            _ => {}
        }

        obj
    }
}

/// Failures folded into [`GameState::Error`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeriveError {
    #[error("{0}")]
    PuzzleFailed(String),

    #[error("puzzle not found")]
    PuzzleMissing,

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("completed puzzle {puzzle_id} has no score")]
    MissingScore { puzzle_id: String },
}

/// Derives game states under a fixed resolver policy.
///
/// Holds no mutable state; one deriver can serve overlapping calls from any
/// thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameStateDeriver {
    resolver: OrderingResolver,
}

impl GameStateDeriver {
    pub fn new(policy: ResolverPolicy) -> Self {
        Self {
            resolver: OrderingResolver::new(policy),
        }
    }

    pub fn policy(&self) -> &ResolverPolicy {
        self.resolver.policy()
    }

    /// Derive the current game state. Never fails.
    pub fn derive(
        &self,
        puzzle: &PuzzleSource,
        auth: &AuthSource,
        progress: &ProgressSource,
        session: &SessionState,
    ) -> GameState {
        match self.try_derive(puzzle, auth, progress, session) {
            Ok(state) => {
                tracing::debug!(
                    state = state.kind(),
                    puzzle_id = state.puzzle().map(|p| p.id.as_str()),
                    events = state.puzzle().map(Puzzle::len),
                    relative = ?self.policy().relative,
                    "derived game state"
                );
                state
            }
            Err(err) => {
                tracing::warn!(error = %err, "game state derivation failed");
                GameState::Error {
                    message: err.to_string(),
                }
            }
        }
    }

    fn try_derive(
        &self,
        puzzle_source: &PuzzleSource,
        auth: &AuthSource,
        progress: &ProgressSource,
        session: &SessionState,
    ) -> Result<GameState, DeriveError> {
        if puzzle_source.is_loading {
            return Ok(GameState::LoadingPuzzle);
        }
        if let Some(error) = &puzzle_source.error {
            return Err(DeriveError::PuzzleFailed(error.clone()));
        }
        let puzzle = puzzle_source
            .puzzle
            .as_ref()
            .ok_or(DeriveError::PuzzleMissing)?;

        if auth.is_loading {
            return Ok(GameState::LoadingAuth);
        }
        let authenticated = auth.is_authenticated;
        if authenticated && progress.is_loading {
            return Ok(GameState::LoadingProgress);
        }

        // Server progress only counts for authenticated players
        let server = if authenticated {
            progress.progress.as_ref()
        } else {
            None
        };

        let baseline = puzzle.baseline_order();
        let server_hints = server.map_or(&[][..], |p| p.hints.as_slice());
        let hints = merge_hints(server_hints, &session.hints);

        let is_complete = if authenticated {
            server.is_some_and(ProgressData::is_completed)
        } else {
            session.is_committed()
        };

        if is_complete {
            let (preferred, authoritative_score) = match server {
                Some(p) => (&p.ordering, p.score),
                None => (&session.ordering, session.score),
            };
            let score = authoritative_score
                .or(session.score)
                .ok_or_else(|| DeriveError::MissingScore {
                    puzzle_id: puzzle.id.clone(),
                })?;
            let final_order = self.resolver.resolve(&baseline, preferred, &hints)?;

            return Ok(GameState::Completed {
                puzzle: puzzle.clone(),
                final_order,
                correct_order: correct_order(puzzle),
                score,
                hints,
            });
        }

        let preferred = match server {
            Some(p) if !p.ordering.is_empty() => &p.ordering,
            _ => &session.ordering,
        };
        let current_order = self.resolver.resolve(&baseline, preferred, &hints)?;

        Ok(GameState::Ready {
            puzzle: puzzle.clone(),
            current_order,
            hints,
        })
    }
}

/// Derive with the default resolver policy.
pub fn derive_game_state(
    puzzle: &PuzzleSource,
    auth: &AuthSource,
    progress: &ProgressSource,
    session: &SessionState,
) -> GameState {
    GameStateDeriver::default().derive(puzzle, auth, progress, session)
}
