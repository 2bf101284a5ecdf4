//! Session and turn types

use super::Metrics;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const SESSION_ID_PREFIX: &str = "SIP";
const SESSION_ID_SUFFIX_LEN: usize = 4;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// The human/adversary side of the conversation
    #[serde(rename = "scammer")]
    Initiator,
    /// The automated honeypot responder
    #[serde(rename = "agent")]
    Responder,
}

/// One message exchanged within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Local client clock, not authoritative
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The authoritative record of the current conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    id: String,
    history: Vec<Turn>,
    metrics: Metrics,
}

impl Session {
    /// Start a fresh session with an unused id, empty history and zeroed metrics
    pub fn create() -> Self {
        Self {
            id: generate_session_id(),
            history: Vec::new(),
            metrics: Metrics::default(),
        }
    }

    /// Build the session that supersedes this one.
    ///
    /// The caller swaps it in as a single unit. The new id never equals the
    /// one being replaced, even if two ids land in the same millisecond with
    /// the same random suffix.
    pub fn reset(&self) -> Self {
        let mut next = Self::create();
        while next.id == self.id {
            next.id = generate_session_id();
        }
        next
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Append the outgoing message. Returns `None` (and leaves history alone)
    /// when the content is blank after trimming.
    pub fn append_initiator_turn(&mut self, content: &str) -> Option<&Turn> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        self.history.push(Turn::now(Role::Initiator, content));
        self.history.last()
    }

    /// Append the responder's reply. Empty content is kept: a blank reply
    /// from the service is itself a signal.
    pub fn append_responder_turn(&mut self, content: &str) -> &Turn {
        self.history.push(Turn::now(Role::Responder, content));
        &self.history[self.history.len() - 1]
    }

    /// Replace the metrics with a freshly derived set
    pub fn set_metrics(&mut self, metrics: Metrics) {
        self.metrics = metrics;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::create()
    }
}

/// `SIP-<millis base36>-<4 random base36>`, upper case
fn generate_session_id() -> String {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SESSION_ID_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("{SESSION_ID_PREFIX}-{}-{suffix}", to_base36(millis))
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        // value % 36 < 36, so the index is always in range
        #[allow(clippy::cast_possible_truncation)]
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
