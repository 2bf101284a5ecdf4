//! Interaction controller executor

use super::{Queued, SessionEvent, SessionSnapshot};
use crate::error::InteractionError;
use crate::session::Session;
use crate::state_machine::{transition, ControllerState, Effect, Event};
use crate::transport::{DetectionRequest, DetectionTransport};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Owns the live session and drives one request/response cycle at a time
pub struct InteractionController<T>
where
    T: DetectionTransport + 'static,
{
    state: ControllerState,
    session: Session,
    transport: Arc<T>,
    event_rx: mpsc::Receiver<Queued>,
    /// Weak so the loop ends once every handle is gone
    event_tx: mpsc::WeakSender<Queued>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<T> InteractionController<T>
where
    T: DetectionTransport + 'static,
{
    pub fn new(
        session: Session,
        transport: T,
        event_rx: mpsc::Receiver<Queued>,
        event_tx: mpsc::WeakSender<Queued>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        Self {
            state: ControllerState::Idle,
            session,
            transport: Arc::new(transport),
            event_rx,
            event_tx,
            broadcast_tx,
            snapshot_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            session_id = %self.session.id(),
            endpoint = %self.transport.endpoint(),
            "Starting interaction controller"
        );

        while let Some(Queued { event, processed }) = self.event_rx.recv().await {
            self.process_event(event);
            if let Some(processed) = processed {
                let _ = processed.send(());
            }
        }

        tracing::info!(session_id = %self.session.id(), "Interaction controller stopped");
    }

    fn process_event(&mut self, event: Event) {
        let result = match transition(&self.state, &self.session, event) {
            Ok(r) => r,
            Err(e) => {
                // Rejections are user-facing (busy, reset while in flight), not failures
                tracing::debug!(session_id = %self.session.id(), reason = %e, "Event rejected");
                let _ = self.broadcast_tx.send(SessionEvent::Rejected {
                    reason: e.to_string(),
                });
                return;
            }
        };

        let was_locked = self.state.is_input_locked();
        self.state = result.new_state;

        let mut notifications = Vec::new();
        let mut follow_ups = Vec::new();
        for effect in result.effects {
            self.execute_effect(effect, &mut notifications, &mut follow_ups);
        }

        let input_locked = self.state.is_input_locked();
        if was_locked != input_locked {
            notifications.push(SessionEvent::StateChange { input_locked });
        }

        // Snapshot first so subscribers reacting to a delta read consistent state
        self.snapshot_tx.send_replace(SessionSnapshot {
            session: self.session.clone(),
            input_locked,
            pending_message: self.state.pending_message().map(str::to_string),
        });
        for notification in notifications {
            let _ = self.broadcast_tx.send(notification);
        }

        // Outcomes decided without a round trip through the channel
        for event in follow_ups {
            self.process_event(event);
        }
    }

    fn execute_effect(
        &mut self,
        effect: Effect,
        notifications: &mut Vec<SessionEvent>,
        follow_ups: &mut Vec<Event>,
    ) {
        match effect {
            Effect::AppendInitiatorTurn { content } => {
                if let Some(turn) = self.session.append_initiator_turn(&content) {
                    notifications.push(SessionEvent::TurnAppended { turn: turn.clone() });
                }
            }

            Effect::AppendResponderTurn { content } => {
                let turn = self.session.append_responder_turn(&content).clone();
                notifications.push(SessionEvent::TurnAppended { turn });
            }

            Effect::RequestDetection { request } => {
                if let Err(error) = self.request_detection(request) {
                    follow_ups.push(Event::DetectionFailed { error });
                }
            }

            Effect::ApplyMetrics { metrics } => {
                self.session.set_metrics(metrics);
                tracing::info!(
                    session_id = %self.session.id(),
                    turns = metrics.turns,
                    confidence = metrics.confidence,
                    classification = %metrics.classification,
                    "Metrics updated"
                );
                notifications.push(SessionEvent::MetricsUpdated { metrics });
            }

            Effect::ReplaceSession => {
                let next = self.session.reset();
                let previous = std::mem::replace(&mut self.session, next);
                tracing::info!(
                    previous_id = %previous.id(),
                    session_id = %self.session.id(),
                    "Session reset"
                );
                notifications.push(SessionEvent::SessionReplaced {
                    session_id: self.session.id().to_string(),
                });
            }

            Effect::NotifyAnalysis { response } => {
                notifications.push(SessionEvent::Analysis { response });
            }

            Effect::NotifyError { error } => {
                if error.is_failure() {
                    tracing::warn!(session_id = %self.session.id(), error = %error, "Request failed");
                } else {
                    tracing::debug!(session_id = %self.session.id(), "Ignoring empty message");
                }
                notifications.push(SessionEvent::Error { error });
            }

            Effect::NotifySettled => notifications.push(SessionEvent::Settled),
        }
    }

    /// Spawn the transport call; its outcome re-enters the loop as an event.
    ///
    /// Fails when no handle is left to carry the outcome back, in which case
    /// the request is never sent.
    fn request_detection(&self, request: DetectionRequest) -> Result<(), InteractionError> {
        let Some(event_tx) = self.event_tx.upgrade() else {
            tracing::warn!(session_id = %self.session.id(), "All handles dropped, not sending request");
            return Err(InteractionError::TransportFailure {
                status: None,
                message: "controller shut down before the request was sent".to_string(),
            });
        };
        let transport = Arc::clone(&self.transport);

        tracing::info!(
            session_id = %request.conversation_id,
            history_len = request.history.len(),
            "Sending detection request (background)"
        );

        tokio::spawn(async move {
            let event = match transport.detect(&request).await {
                Ok(response) => Event::DetectionSucceeded {
                    response: Box::new(response),
                },
                Err(e) => Event::DetectionFailed {
                    error: InteractionError::from(e),
                },
            };
            let _ = event_tx.send(Queued::from(event)).await;
        });
        Ok(())
    }
}
