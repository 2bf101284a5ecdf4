//! Wire types for the detection service

use crate::session::{Role, Turn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One prior turn as the service expects it in `history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Turn> for HistoryEntry {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
            timestamp: turn.timestamp,
        }
    }
}

/// Body of `POST /detect`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRequest {
    pub conversation_id: String,
    pub message: String,
    pub history: Vec<HistoryEntry>,
}

impl DetectionRequest {
    pub fn new(conversation_id: impl Into<String>, message: impl Into<String>, history: &[Turn]) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message: message.into(),
            history: history.iter().map(HistoryEntry::from).collect(),
        }
    }
}

/// Successful body of `POST /detect`.
///
/// `response_message`, `scam_detected`, `confidence_score` and
/// `engagement_metrics` are required; a body without them fails to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub response_message: String,
    pub scam_detected: bool,
    pub confidence_score: f64,
    #[serde(default)]
    pub agent_activated: bool,
    #[serde(default)]
    pub extracted_intelligence: ExtractedIntelligence,
    pub engagement_metrics: EngagementMetrics,
}

/// Intelligence the service pulled out of the conversation.
///
/// Every list is empty rather than absent when nothing was found.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedIntelligence {
    #[serde(deserialize_with = "null_as_empty")]
    pub bank_accounts: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub upi_ids: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub phone_numbers: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub urls: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub ifsc_codes: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub emails: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub pan_cards: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub aadhaar_numbers: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub bank_names: Vec<String>,
    pub extracted_count: u32,
}

impl ExtractedIntelligence {
    /// Labelled, non-empty categories in display order
    pub fn categories(&self) -> Vec<(&'static str, &[String])> {
        [
            ("BANK ACCOUNT", self.bank_accounts.as_slice()),
            ("IFSC CODE", self.ifsc_codes.as_slice()),
            ("UPI IDENTIFIER", self.upi_ids.as_slice()),
            ("PHONE NUMBER", self.phone_numbers.as_slice()),
            ("EMAIL", self.emails.as_slice()),
            ("SUSPICIOUS URL", self.urls.as_slice()),
            ("PAN CARD", self.pan_cards.as_slice()),
            ("AADHAAR", self.aadhaar_numbers.as_slice()),
            ("BANK NAME", self.bank_names.as_slice()),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.categories().is_empty()
    }
}

/// Engagement counters maintained by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub total_turns: u32,
    #[serde(default)]
    pub agent_turns: u32,
    pub intelligence_items_found: u32,
    #[serde(default)]
    pub conversation_duration_seconds: f64,
}

/// Body of `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
}

impl ServiceStatus {
    pub fn is_online(&self) -> bool {
        self.status.eq_ignore_ascii_case("online")
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
