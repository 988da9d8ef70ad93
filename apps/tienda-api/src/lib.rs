//! # tienda-api: Order Intake HTTP Service
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           tienda-api                                    │
//! │                                                                         │
//! │  routes ──► services ──► ports ──► tienda-db repositories ──► SQLite   │
//! │    │           │                                                        │
//! │    │           └── tienda-core (validation, pricing, order numbers)    │
//! │    └── error (ApiError → JSON)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`] - environment configuration
//! - [`error`] - HTTP error mapping
//! - [`ports`] - catalog and order store traits
//! - [`services`] - intake, query, resolver, allocator
//! - [`routes`] - axum router and handlers
//! - [`state`] - shared handler state

pub mod config;
pub mod error;
pub mod ports;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{ApiConfig, ConfigError, Environment};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::router;
pub use state::AppState;
