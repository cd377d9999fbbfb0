//! # tablemeter-service
//!
//! Runtime shell around `tablemeter-core`: shared state, configuration and
//! logging.
//!
//! ## Module Organization
//! ```text
//! tablemeter_service/
//! ├── lib.rs          ◄─── You are here (re-exports, tracing setup)
//! ├── config.rs       ◄─── tablemeter.toml + TABLEMETER_* overrides
//! ├── error.rs        ◄─── ServiceError + ErrorCode
//! ├── service.rs      ◄─── VisitService (caller-facing API)
//! └── state/
//!     ├── floor.rs    ◄─── tables + ledger behind one RwLock
//!     └── pricing.rs  ◄─── live price per minute
//! ```
//!
//! ## Startup
//! ```rust,no_run
//! use tablemeter_service::{init_tracing, ServiceConfig, VisitService};
//!
//! let config = ServiceConfig::load_or_default(None);
//! init_tracing(&config.logging.filter);
//! let service = VisitService::from_config(&config)?;
//! # Ok::<(), tablemeter_service::ServiceError>(())
//! ```

pub mod config;
pub mod error;
pub mod service;
pub mod state;

pub use config::ServiceConfig;
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use service::VisitService;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG` wins when set (e.g. `RUST_LOG=tablemeter_core=trace`)
/// - otherwise `default_filter`, normally `config.logging.filter`
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
