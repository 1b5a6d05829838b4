//! Lost & Found Server - HTTP REST API for lost & found report matching
//!
//! This crate exposes the matching engine over HTTP:
//!
//! - **Reports**: Intake and lookup of lost and found reports
//! - **Matching**: Batch scoring of every lost × found pair, with owner
//!   notifications for high-confidence matches
//! - **Health & Metrics**: Liveness/readiness probes and Prometheus metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//! - `POST /api/lost`, `GET /api/lost`, `GET /api/lost/{id}`
//! - `POST /api/found`, `GET /api/found`, `GET /api/found/{id}`
//! - `POST /api/matches/match` - Run matching and notify owners
//! - `POST /api/matches/send-email` - Notify the owner for one pair
//! - `POST /api/matches/test-matching` - Score built-in sample pairs

pub mod config;
pub mod error;
pub mod middleware;
pub mod notify;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use notify::{LogNotifier, Notice, Notifier, NotifyError};
pub use server::{build_router, start_server};
pub use state::ServerState;
pub use store::{CategoryCount, InMemoryReportStore, NewReport, ReportStore, StoreError};
