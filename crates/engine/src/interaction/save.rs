use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{CursorIconId, ItemId};

pub const INTERACTION_SAVE_VERSION: u32 = 1;

/// The slice of interaction state a save game carries. Opaque to the save
/// collaborator; it only stores the JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionSaveState {
    pub save_version: u32,
    pub armed_icon: Option<CursorIconId>,
    pub carried_item: Option<ItemId>,
    pub cycle_index: i32,
}

#[derive(Debug, Error)]
pub enum SaveStateError {
    #[error("failed to encode interaction save state: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode interaction save state: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("unsupported interaction save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl InteractionSaveState {
    pub fn to_json(&self) -> Result<String, SaveStateError> {
        serde_json::to_string(self).map_err(SaveStateError::Encode)
    }

    pub fn from_json(raw: &str) -> Result<Self, SaveStateError> {
        let state: Self = serde_json::from_str(raw).map_err(SaveStateError::Decode)?;
        if state.save_version != INTERACTION_SAVE_VERSION {
            return Err(SaveStateError::UnsupportedVersion {
                found: state.save_version,
                expected: INTERACTION_SAVE_VERSION,
            });
        }
        Ok(state)
    }
}
