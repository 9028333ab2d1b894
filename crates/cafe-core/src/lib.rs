//! # cafe-core
//!
//! Core types and traits for the CafeRadius backend.
//!
//! This crate provides:
//! - `RecordStore` trait for the hosted database behind the API
//! - `Cafe` and `Voucher` rows as the store returns them
//! - `NewVoucher` and `VoucherCode` for voucher issuance
//! - `MemoryRecordStore` for tests and local runs
//! - `StoreError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use cafe_core::{NewVoucher, RecordStore};
//! use serde_json::json;
//!
//! let voucher = NewVoucher::issue(Some(json!("c1")), Some(json!("d1")));
//! let stored = store.insert_voucher(&voucher).await?;
//!
//! let verified = store.find_voucher(&stored.code).await?;
//! assert_eq!(verified.cafe().and_then(|c| c.id().cloned()), Some(json!("c1")));
//! ```

pub mod cafe;
pub mod error;
pub mod memory;
pub mod store;
pub mod voucher;

// Re-exports for convenience
pub use cafe::Cafe;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryRecordStore;
pub use store::{RecordStore, SharedRecordStore};
pub use voucher::{
    voucher_validity, NewVoucher, Voucher, VoucherCode, CODE_PREFIX, CODE_SUFFIX_LEN,
    VOUCHER_VALIDITY_HOURS,
};
