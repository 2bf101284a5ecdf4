//! Runtime for executing interactions
//!
//! One controller task per session handle. Callers talk to it through a
//! cloneable [`ControllerHandle`]; the presentation layer follows along via
//! broadcast deltas and a watch channel holding the full snapshot.

mod executor;


use executor::InteractionController;

use crate::error::{ControllerClosed, InteractionError};
use crate::session::{Metrics, Session, Turn};
use crate::state_machine::Event;
use crate::transport::{DetectionResponse, DetectionTransport};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

const EVENT_CHANNEL_CAPACITY: usize = 32;
const BROADCAST_CAPACITY: usize = 128;

/// Events sent to presentation subscribers
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Input lock engaged or released
    StateChange { input_locked: bool },
    TurnAppended { turn: Turn },
    MetricsUpdated { metrics: Metrics },
    /// Full response for the analysis view
    Analysis { response: Box<DetectionResponse> },
    SessionReplaced { session_id: String },
    Error { error: InteractionError },
    /// Event refused by the state machine (busy, reset while in flight)
    Rejected { reason: String },
    /// The in-flight request finished, successfully or not
    Settled,
}

/// Complete observable state, replaced as one value after every transition
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session: Session,
    pub input_locked: bool,
    /// The message awaiting a reply while input is locked
    pub pending_message: Option<String>,
}

/// An event on its way into the controller loop
pub(crate) struct Queued {
    pub event: Event,
    /// Fired once the event and everything it triggered have been applied
    pub processed: Option<oneshot::Sender<()>>,
}

impl From<Event> for Queued {
    fn from(event: Event) -> Self {
        Self {
            event,
            processed: None,
        }
    }
}

/// Handle to interact with a running controller
#[derive(Clone)]
pub struct ControllerHandle {
    event_tx: mpsc::Sender<Queued>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl ControllerHandle {
    /// Submit a message. Returns once the controller has applied it, so the
    /// snapshot already shows the lock when a request went out.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), ControllerClosed> {
        self.send(Event::Submit { text: text.into() }).await
    }

    /// Ask for a fresh session; refused while a request is in flight
    pub async fn reset(&self) -> Result<(), ControllerClosed> {
        self.send(Event::Reset).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Current session and lock state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    async fn send(&self, event: Event) -> Result<(), ControllerClosed> {
        let (processed_tx, processed_rx) = oneshot::channel();
        self.event_tx
            .send(Queued {
                event,
                processed: Some(processed_tx),
            })
            .await
            .map_err(|_| ControllerClosed)?;
        processed_rx.await.map_err(|_| ControllerClosed)
    }
}

/// Start a controller for a fresh session on the current tokio runtime.
///
/// The task stops once every handle is dropped and no request is in flight.
pub fn spawn<T: DetectionTransport + 'static>(transport: T) -> ControllerHandle {
    spawn_with_session(transport, Session::create())
}

pub fn spawn_with_session<T: DetectionTransport + 'static>(
    transport: T,
    session: Session,
) -> ControllerHandle {
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
    let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot {
        session: session.clone(),
        input_locked: false,
        pending_message: None,
    });

    let controller = InteractionController::new(
        session,
        transport,
        event_rx,
        event_tx.downgrade(),
        broadcast_tx.clone(),
        snapshot_tx,
    );
    tokio::spawn(controller.run());

    ControllerHandle {
        event_tx,
        broadcast_tx,
        snapshot_rx,
    }
}
