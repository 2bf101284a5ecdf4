//! Line-oriented terminal rendering of session events

use crate::error::InteractionError;
use crate::runtime::{SessionEvent, SessionSnapshot};
use crate::session::{Metrics, Role, Turn};
use crate::transport::DetectionResponse;
use chrono::{DateTime, Local, Utc};

/// A line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(String),
    Clear,
    Status,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/clear" | "/reset" => Command::Clear,
            "/status" => Command::Status,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Submit(line.to_string()),
        }
    }
}

pub const CLEAR_PROMPT: &str = "Clear current session and reset all data? [y/N]";

/// Only an explicit yes confirms a destructive command
pub fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn banner(session_id: &str, endpoint: &str) -> Vec<String> {
    vec![
        "=== HONEYPOT CONSOLE ===".to_string(),
        format!("SESSION {session_id}"),
        format!("ENDPOINT {endpoint}"),
        "Type a message to send it. /status, /clear, /help, /quit".to_string(),
    ]
}

pub fn help() -> Vec<String> {
    vec![
        "/status  show session id, history length and metrics".to_string(),
        "/clear   discard this session and start a new one".to_string(),
        "/quit    leave the console".to_string(),
    ]
}

/// Lines to print for one event; empty when the event has no visible effect
pub fn render(event: &SessionEvent) -> Vec<String> {
    match event {
        SessionEvent::StateChange { input_locked: true } => vec!["... analysing".to_string()],
        SessionEvent::StateChange { input_locked: false } | SessionEvent::Settled => vec![],
        SessionEvent::TurnAppended { turn } => render_turn(turn),
        SessionEvent::MetricsUpdated { metrics } => vec![metrics_line(metrics)],
        SessionEvent::Analysis { response } => render_analysis(response),
        SessionEvent::SessionReplaced { session_id } => {
            vec![format!("--- new session {session_id} ---")]
        }
        SessionEvent::Error {
            error: InteractionError::EmptyInput,
        } => vec![],
        SessionEvent::Error { error } => vec![format!(
            "[{}] SYSTEM ERROR: {error}",
            clock(&Utc::now())
        )],
        SessionEvent::Rejected { reason } => vec![format!("(ignored) {reason}")],
    }
}

pub fn render_status(snapshot: &SessionSnapshot) -> Vec<String> {
    vec![
        format!("SESSION {}", snapshot.session.id()),
        format!("MESSAGES {}", snapshot.session.history().len()),
        metrics_line(snapshot.session.metrics()),
        match (&snapshot.pending_message, snapshot.input_locked) {
            (Some(message), true) => format!("INPUT locked, awaiting reply to \"{message}\""),
            (None, true) => "INPUT locked (request in flight)".to_string(),
            (_, false) => "INPUT ready".to_string(),
        },
    ]
}

fn render_turn(turn: &Turn) -> Vec<String> {
    let source = match turn.role {
        Role::Initiator => "THREAT ACTOR",
        Role::Responder => "HONEYPOT AGENT",
    };
    vec![
        format!("[{}] {source}", clock(&turn.timestamp)),
        format!("  {}", turn.content),
    ]
}

fn metrics_line(metrics: &Metrics) -> String {
    format!(
        "TURNS {} | CONFIDENCE {} | INTEL {} | {}",
        metrics.turns,
        percent(metrics.confidence),
        metrics.intelligence_items_found,
        metrics.classification
    )
}

fn render_analysis(response: &DetectionResponse) -> Vec<String> {
    let mut lines = vec![
        format!(
            "THREAT ASSESSMENT: {}",
            if response.scam_detected {
                "SCAM DETECTED"
            } else {
                "NO IMMEDIATE THREAT"
            }
        ),
        format!(
            "  confidence {} | agent {}",
            percent(response.confidence_score.clamp(0.0, 1.0)),
            if response.agent_activated {
                "ENGAGED"
            } else {
                "MONITORING"
            }
        ),
    ];

    let categories = response.extracted_intelligence.categories();
    if !categories.is_empty() {
        lines.push("EXTRACTED INTELLIGENCE".to_string());
        for (label, items) in categories {
            lines.extend(items.iter().map(|item| format!("  {label}: {item}")));
        }
    }

    let engagement = &response.engagement_metrics;
    lines.push(format!(
        "ENGAGEMENT: total turns {} | agent turns {} | duration {}s",
        engagement.total_turns, engagement.agent_turns, engagement.conversation_duration_seconds
    ));
    lines
}

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

fn clock(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}
