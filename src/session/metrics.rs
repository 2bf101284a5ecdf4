//! Metrics derived from detection responses

use crate::transport::DetectionResponse;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence strictly above this value, with a positive detection, is a high threat
pub const HIGH_THREAT_THRESHOLD: f64 = 0.7;

/// Discrete threat level for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// No successful response yet in this session
    #[default]
    Unknown,
    LowThreat,
    MediumThreat,
    HighThreat,
}

impl Classification {
    pub fn label(self) -> &'static str {
        match self {
            Classification::Unknown => "UNKNOWN",
            Classification::LowThreat => "LOW THREAT",
            Classification::MediumThreat => "MEDIUM THREAT",
            Classification::HighThreat => "HIGH THREAT",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Running session metrics, fully recomputed from each successful response
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub turns: u32,
    /// Always within `[0, 1]`
    pub confidence: f64,
    pub intelligence_items_found: u32,
    pub classification: Classification,
}

/// Map a detection flag and confidence to a threat level.
///
/// Never returns `Unknown`; that level only exists before the first response.
pub fn classify(scam_detected: bool, confidence: f64) -> Classification {
    if !scam_detected {
        Classification::LowThreat
    } else if confidence > HIGH_THREAT_THRESHOLD {
        Classification::HighThreat
    } else {
        Classification::MediumThreat
    }
}

/// Derive the full metrics set from a response.
///
/// Turn and intelligence counts come straight from the service, which may
/// count turns differently from local history. The confidence score is
/// untrusted input and is clamped into `[0, 1]`.
pub fn derive_metrics(response: &DetectionResponse) -> Metrics {
    let confidence = clamp_confidence(response.confidence_score);
    Metrics {
        turns: response.engagement_metrics.total_turns,
        confidence,
        intelligence_items_found: response.engagement_metrics.intelligence_items_found,
        classification: classify(response.scam_detected, confidence),
    }
}

fn clamp_confidence(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
