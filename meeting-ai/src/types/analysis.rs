//! Types for transcript analysis operations.

use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Team member context passed to the provider so it can attribute action items to people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub display_name: String,
    pub email: String,
}

/// Action item as extracted by the model, before it is matched to a team member.
///
/// `owner` is whatever name the model attributed the item to; it is a hint, not an identity.
/// `priority` is free text and is normalized by the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedActionItem {
    pub description: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// Structured result of analyzing one transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptAnalysis {
    pub summary: String,
    #[serde(default)]
    pub action_items: Vec<ExtractedActionItem>,
    /// Model self-reported confidence in [0, 1]
    #[serde(default)]
    pub confidence: f64,
}

impl TranscriptAnalysis {
    /// Parses the JSON document a provider's model returned.
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        serde_json::from_str(raw).map_err(|e| Error::Deserialization(e.to_string()))
    }
}
