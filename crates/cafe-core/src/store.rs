//! # Record Store Trait
//!
//! The seam between the HTTP façade and the hosted database.
//! Implementations: Supabase (PostgREST), in-memory.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     RecordStore (trait)                     │
//! │  ├── list_cafes()                                           │
//! │  ├── insert_voucher()                                       │
//! │  ├── find_voucher()                                         │
//! │  └── backend_name()                                         │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!               ┌────────────┴────────────┐
//!       ┌───────┴───────┐         ┌───────┴───────┐
//!       │   Supabase    │         │    Memory     │
//!       │  RecordStore  │         │  RecordStore  │
//!       └───────────────┘         └───────────────┘
//! ```

use crate::cafe::Cafe;
use crate::error::StoreResult;
use crate::voucher::{NewVoucher, Voucher};
use async_trait::async_trait;
use std::sync::Arc;

/// Persistence operations the façade delegates to.
///
/// Each handler makes exactly one of these calls per request.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All rows of the café collection, unfiltered and unpaginated.
    async fn list_cafes(&self) -> StoreResult<Vec<Cafe>>;

    /// Insert a single voucher and return the stored row.
    async fn insert_voucher(&self, voucher: &NewVoucher) -> StoreResult<Voucher>;

    /// Fetch the one voucher whose code equals `code` exactly, with its café
    /// embedded under `cafes`.
    ///
    /// # Returns
    /// `StoreError::NotFound` for zero matches, `StoreError::Ambiguous` for
    /// more than one.
    async fn find_voucher(&self, code: &str) -> StoreResult<Voucher>;

    /// Backend name (for logging).
    fn backend_name(&self) -> &'static str;
}

/// Process-wide store handle, built once at startup
pub type SharedRecordStore = Arc<dyn RecordStore>;
