//! Content pack → director configuration.
//!
//! Packs carry far more than the director needs (questions, notice rules,
//! boss cases, NPC scripts...). Only `events` and `difficultyCurve` are read
//! here; everything else is ignored. Content validation belongs to the pack
//! loader, not to this crate.

use serde::Deserialize;

use crate::difficulty::DifficultyCurve;
use crate::director::DirectorConfig;
use crate::events::Event;

/// The subset of a content pack the director consumes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackDirectorSection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
    pub difficulty_curve: Option<DifficultyCurve>,
}

/// Errors that can occur while reading a pack.
#[derive(Debug)]
pub enum PackError {
    Parse(serde_json::Error),
    MissingDifficultyCurve,
}

impl From<serde_json::Error> for PackError {
    fn from(e: serde_json::Error) -> Self {
        PackError::Parse(e)
    }
}

impl std::fmt::Display for PackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackError::Parse(e) => write!(f, "Pack parse error: {}", e),
            PackError::MissingDifficultyCurve => write!(f, "Pack has no difficultyCurve"),
        }
    }
}

impl std::error::Error for PackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackError::Parse(e) => Some(e),
            PackError::MissingDifficultyCurve => None,
        }
    }
}

/// Parse a content pack's director section.
pub fn parse_pack(json: &str) -> Result<PackDirectorSection, PackError> {
    Ok(serde_json::from_str(json)?)
}

/// Build a [`DirectorConfig`] from pack JSON.
pub fn load_director_config(json: &str, seed: Option<i64>) -> Result<DirectorConfig, PackError> {
    let pack = parse_pack(json)?;
    let difficulty_curve = pack
        .difficulty_curve
        .ok_or(PackError::MissingDifficultyCurve)?;
    log::debug!(
        "Loaded pack {} with {} events",
        pack.id.as_deref().unwrap_or("<unnamed>"),
        pack.events.len()
    );
    Ok(DirectorConfig {
        events: pack.events,
        difficulty_curve,
        seed,
    })
}
