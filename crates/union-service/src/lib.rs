//! HTTP front end of the chains-union dispatcher.

pub mod server;
pub mod telemetry;

pub use server::{router, serve, AppState};
pub use telemetry::{init_tracing, TelemetryConfig};
