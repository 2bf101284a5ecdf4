//! Session state: conversation identity, history and derived metrics
//!
//! Pure data plus update rules. Nothing in here performs I/O; the runtime
//! owns the single live `Session` and swaps it out wholesale on reset.

mod metrics;
mod state;

pub use metrics::{classify, derive_metrics, Classification, Metrics};
pub use state::{Role, Session, Turn};
