#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod extractors;
pub mod infra;
pub mod logging;
pub mod mail;
pub mod maintenance;
pub mod middleware;
pub mod repos;
pub mod routes;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod trace_ctx;

// Re-exports for public API
pub use auth::{Claims, CodecError, TokenAuthority};
pub use config::Config;
pub use error::AppError;
pub use infra::registry::{BackendHandle, Backends, FailurePolicy};
pub use maintenance::Scheduler;
pub use middleware::cors::cors_middleware;
pub use middleware::jwt_extract::JwtExtract;
pub use middleware::request_trace::RequestTrace;
pub use middleware::structured_logger::StructuredLogger;
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    telemetry::init_test_tracing();
}
