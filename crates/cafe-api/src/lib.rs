//! # cafe-api
//!
//! HTTP API layer for the CafeRadius backend.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for cafés and vouchers
//! - Environment-driven configuration and store selection
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/health` | Health check |
//! | GET | `/api/test` | Static confirmation |
//! | GET | `/api/debug` | Configuration presence |
//! | GET | `/api/cafes` | List cafés |
//! | POST | `/api/vouchers/create` | Issue voucher |
//! | GET | `/api/vouchers/verify/{code}` | Verify voucher |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, StoreBackend};
