//! Versioned save-game encoding. Reading and writing files is the caller's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::simulation::GameState;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("snapshot version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u64, expected: u32 },
}

#[derive(Serialize)]
struct Envelope<'a> {
    version: u32,
    state: &'a GameState,
}

#[derive(Deserialize)]
struct Header {
    version: u64,
}

pub fn encode(state: &GameState) -> Result<String, SnapshotError> {
    let envelope = Envelope {
        version: SNAPSHOT_VERSION,
        state,
    };
    Ok(serde_json::to_string(&envelope)?)
}

pub fn decode(text: &str) -> Result<GameState, SnapshotError> {
    let mut value: Value = serde_json::from_str(text)?;
    let header = Header::deserialize(&value)?;
    if header.version != u64::from(SNAPSHOT_VERSION) {
        return Err(SnapshotError::UnsupportedVersion {
            found: header.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    let state = value
        .get_mut("state")
        .map(Value::take)
        .unwrap_or(Value::Null);
    Ok(GameState::deserialize(state)?)
}
