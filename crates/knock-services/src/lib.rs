//! knock-services — session state and the admission decision.

pub mod gate;
pub mod session;
pub mod sweeper;

pub use gate::{AuthGate, Decision, ErrorCategory, GateError};
pub use session::SessionStore;
pub use sweeper::{Sweeper, SESSION_IDLE_TIMEOUT, SWEEP_INTERVAL};
