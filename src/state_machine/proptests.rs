//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::error::InteractionError;
use crate::session::{classify, Classification, Metrics, Role, Session};
use crate::transport::{DetectionResponse, EngagementMetrics, ExtractedIntelligence};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

/// Synchronous stand-in for the runtime executor
struct Harness {
    state: ControllerState,
    session: Session,
    requests_in_flight: usize,
    max_in_flight: usize,
}

impl Harness {
    fn new() -> Self {
        Self {
            state: ControllerState::Idle,
            session: Session::create(),
            requests_in_flight: 0,
            max_in_flight: 0,
        }
    }

    fn step(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let settles = matches!(
            event,
            Event::DetectionSucceeded { .. } | Event::DetectionFailed { .. }
        );
        let result = transition(&self.state, &self.session, event)?;
        if settles {
            self.requests_in_flight -= 1;
        }
        self.state = result.new_state;
        for effect in &result.effects {
            match effect {
                Effect::AppendInitiatorTurn { content } => {
                    self.session.append_initiator_turn(content);
                }
                Effect::AppendResponderTurn { content } => {
                    self.session.append_responder_turn(content);
                }
                Effect::ApplyMetrics { metrics } => self.session.set_metrics(*metrics),
                Effect::ReplaceSession => self.session = self.session.reset(),
                Effect::RequestDetection { .. } => {
                    self.requests_in_flight += 1;
                    self.max_in_flight = self.max_in_flight.max(self.requests_in_flight);
                }
                Effect::NotifyAnalysis { .. } | Effect::NotifyError { .. } | Effect::NotifySettled => {}
            }
        }
        Ok(result.effects)
    }
}

fn response(scam_detected: bool, confidence_score: f64, total_turns: u32) -> Box<DetectionResponse> {
    Box::new(DetectionResponse {
        conversation_id: None,
        response_message: "reply".to_string(),
        scam_detected,
        confidence_score,
        agent_activated: scam_detected,
        extracted_intelligence: ExtractedIntelligence::default(),
        engagement_metrics: EngagementMetrics {
            total_turns,
            agent_turns: 0,
            intelligence_items_found: 0,
            conversation_duration_seconds: 0.0,
        },
    })
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{1,30}".prop_map(String::from),
        "[ \t\n]{0,5}".prop_map(String::from),
    ]
}

fn arb_error() -> impl Strategy<Value = InteractionError> {
    prop_oneof![
        (proptest::option::of(400u16..600), "[a-z ]{0,20}")
            .prop_map(|(status, message)| InteractionError::TransportFailure { status, message }),
        "[a-z ]{0,20}".prop_map(|message| InteractionError::MalformedResponse { message }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        3 => arb_text().prop_map(|text| Event::Submit { text }),
        1 => Just(Event::Reset),
        2 => (any::<bool>(), -1.0f64..2.0, 0u32..50).prop_map(|(scam, confidence, turns)| {
            Event::DetectionSucceeded {
                response: response(scam, confidence, turns),
            }
        }),
        2 => arb_error().prop_map(|error| Event::DetectionFailed { error }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// At most one transport invocation is ever outstanding, and rejected
    /// events change nothing.
    #[test]
    fn prop_single_flight(events in proptest::collection::vec(arb_event(), 1..60)) {
        let mut harness = Harness::new();
        for event in events {
            let before_state = harness.state.clone();
            let before_session = harness.session.clone();
            if harness.step(event).is_err() {
                prop_assert_eq!(&harness.state, &before_state);
                prop_assert_eq!(&harness.session, &before_session);
            }
            prop_assert!(harness.requests_in_flight <= 1);
            prop_assert_eq!(harness.state.is_input_locked(), harness.requests_in_flight == 1);
        }
        prop_assert!(harness.max_in_flight <= 1);
    }

    /// History only grows between resets, and only an accepted result appends
    /// a responder turn.
    #[test]
    fn prop_history_is_append_only(events in proptest::collection::vec(arb_event(), 1..60)) {
        let mut harness = Harness::new();
        for event in events {
            let is_reset = matches!(event, Event::Reset);
            let before = harness.session.history().to_vec();
            let before_id = harness.session.id().to_string();
            let Ok(effects) = harness.step(event) else { continue };

            if is_reset {
                prop_assert!(harness.session.history().is_empty());
                prop_assert_eq!(harness.session.metrics(), &Metrics::default());
                prop_assert_ne!(harness.session.id(), before_id.as_str());
                continue;
            }
            let after = harness.session.history();
            prop_assert!(after.len() >= before.len());
            prop_assert_eq!(&after[..before.len()], before.as_slice());

            let appended_reply = after.len() > before.len()
                && after.last().map(|t| t.role) == Some(Role::Responder);
            let accepted_result = effects.iter().any(|e| matches!(e, Effect::ApplyMetrics { .. }));
            prop_assert_eq!(appended_reply, accepted_result);
        }
    }

    /// Failures leave metrics exactly as they were.
    #[test]
    fn prop_failure_does_not_mutate(
        prior in (any::<bool>(), 0.0f64..=1.0, 0u32..20),
        error in arb_error(),
        text in "[a-z]{1,10}",
    ) {
        let mut harness = Harness::new();
        harness.step(Event::Submit { text: "first".to_string() }).unwrap();
        harness.step(Event::DetectionSucceeded { response: response(prior.0, prior.1, prior.2) }).unwrap();

        harness.step(Event::Submit { text }).unwrap();
        let metrics_before = *harness.session.metrics();
        let history_len = harness.session.history().len();

        harness.step(Event::DetectionFailed { error }).unwrap();
        prop_assert_eq!(harness.session.metrics(), &metrics_before);
        prop_assert_eq!(harness.session.history().len(), history_len);
        prop_assert_eq!(&harness.state, &ControllerState::Idle);
    }

    /// Blank input never reaches the transport or the history.
    #[test]
    fn prop_blank_submit_is_a_no_op(text in "[ \t\r\n]{0,10}") {
        let mut harness = Harness::new();
        let effects = harness.step(Event::Submit { text }).unwrap();
        prop_assert_eq!(harness.requests_in_flight, 0);
        prop_assert!(harness.session.history().is_empty());
        prop_assert_eq!(&harness.state, &ControllerState::Idle);
        prop_assert!(
            effects.iter().all(|e| matches!(e, Effect::NotifyError { .. })),
            "blank submit produced a non-error effect: {:?}",
            effects
        );
    }

    /// Classification is total, deterministic and never `Unknown` after a response.
    #[test]
    fn prop_classification_total(scam in any::<bool>(), confidence in 0.0f64..=1.0) {
        let first = classify(scam, confidence);
        prop_assert_eq!(first, classify(scam, confidence));
        prop_assert_ne!(first, Classification::Unknown);
        let expected = match (scam, confidence > 0.7) {
            (false, _) => Classification::LowThreat,
            (true, true) => Classification::HighThreat,
            (true, false) => Classification::MediumThreat,
        };
        prop_assert_eq!(first, expected);
    }

    /// Each response fully supersedes the previous classification.
    #[test]
    fn prop_latest_response_wins(
        first in (any::<bool>(), 0.0f64..=1.0),
        second in (any::<bool>(), 0.0f64..=1.0),
    ) {
        let mut harness = Harness::new();
        for (scam, confidence) in [first, second] {
            harness.step(Event::Submit { text: "msg".to_string() }).unwrap();
            harness.step(Event::DetectionSucceeded { response: response(scam, confidence, 1) }).unwrap();
        }
        prop_assert_eq!(harness.session.metrics().classification, classify(second.0, second.1));
    }
}

#[test]
fn test_classification_examples() {
    assert_eq!(classify(true, 0.71), Classification::HighThreat);
    assert_eq!(classify(true, 0.70), Classification::MediumThreat);
    assert_eq!(classify(false, 0.99), Classification::LowThreat);
}
