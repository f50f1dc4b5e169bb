//! Cross-device progress sync for the single-track guess game.
//!
//! Two copies of the same logical progress (this device, the remote store)
//! are compared and unified. Merging never loses progress: the richer guess
//! list wins wholesale and completion is sticky.
//!
//! The caller owns the transaction: read both snapshots, call [`reconcile`],
//! write the result back to both stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current `SyncData` format version.
pub const SYNC_FORMAT_VERSION: u32 = 1;

/// Weight of a finished game in the progress score.
const GAME_OVER_WEIGHT: usize = 10;

/// Progress snapshot exchanged between devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncableGameState {
    pub guesses: Vec<i32>,
    pub is_game_over: bool,
    pub timestamp: DateTime<Utc>,
}

impl SyncableGameState {
    pub fn new(guesses: Vec<i32>, is_game_over: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            guesses,
            is_game_over,
            timestamp,
        }
    }

    /// `len(guesses) + 10` if the game is over.
    pub fn progress_score(&self) -> usize {
        self.guesses.len() + if self.is_game_over { GAME_OVER_WEIGHT } else { 0 }
    }
}

/// Check if two snapshots disagree. Timestamps are ignored.
pub fn detect_sync_conflict(local: &SyncableGameState, remote: &SyncableGameState) -> bool {
    local.guesses != remote.guesses || local.is_game_over != remote.is_game_over
}

/// Merge two snapshots.
///
/// The longer guess list wins wholesale, so no guess is ever dropped. Equal
/// lengths fall back to the progress score, then to the local side.
/// Completion is OR-ed and the later timestamp is kept.
pub fn merge_game_states(
    local: &SyncableGameState,
    remote: &SyncableGameState,
) -> SyncableGameState {
    let local_rank = (local.guesses.len(), local.progress_score());
    let remote_rank = (remote.guesses.len(), remote.progress_score());

    let (base, side) = if remote_rank > local_rank {
        (remote, "remote")
    } else {
        (local, "local")
    };
    tracing::debug!(
        local_score = local_rank.1,
        remote_score = remote_rank.1,
        base = side,
        "merging game states"
    );

    SyncableGameState {
        guesses: base.guesses.clone(),
        is_game_over: local.is_game_over || remote.is_game_over,
        timestamp: local.timestamp.max(remote.timestamp),
    }
}

/// Versioned sync envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncData {
    pub version: u32,
    pub device_fingerprint: String,
    pub last_sync: DateTime<Utc>,
    pub state: SyncableGameState,
}

impl SyncData {
    pub fn new(
        device_fingerprint: impl Into<String>,
        state: SyncableGameState,
        last_sync: DateTime<Utc>,
    ) -> Self {
        Self {
            version: SYNC_FORMAT_VERSION,
            device_fingerprint: device_fingerprint.into(),
            last_sync,
            state,
        }
    }

    /// Parse and version-check an envelope.
    pub fn from_json(text: &str) -> Result<Self, SyncError> {
        let data: Self = serde_json::from_str(text)?;
        data.check_version()?;
        Ok(data)
    }

    pub fn to_json(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string(self)?)
    }

    fn check_version(&self) -> Result<(), SyncError> {
        if self.version != SYNC_FORMAT_VERSION {
            return Err(SyncError::UnsupportedVersion {
                found: self.version,
                expected: SYNC_FORMAT_VERSION,
            });
        }
        Ok(())
    }
}

/// Result of reconciling two envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Envelope to write back to both stores.
    pub data: SyncData,
    pub had_conflict: bool,
}

/// Reconcile this device's envelope with the remote one.
///
/// The result carries the local device fingerprint and `now` as its sync time.
pub fn reconcile(
    local: &SyncData,
    remote: &SyncData,
    now: DateTime<Utc>,
) -> Result<SyncOutcome, SyncError> {
    local.check_version()?;
    remote.check_version()?;

    let had_conflict = detect_sync_conflict(&local.state, &remote.state);
    if had_conflict {
        tracing::debug!(
            local_device = %local.device_fingerprint,
            remote_device = %remote.device_fingerprint,
            "sync conflict detected"
        );
    }

    let state = merge_game_states(&local.state, &remote.state);

    Ok(SyncOutcome {
        data: SyncData {
            version: SYNC_FORMAT_VERSION,
            device_fingerprint: local.device_fingerprint.clone(),
            last_sync: now,
            state,
        },
        had_conflict,
    })
}

/// Sync errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("unsupported sync format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("malformed sync data: {0}")]
    Json(#[from] serde_json::Error),
}
