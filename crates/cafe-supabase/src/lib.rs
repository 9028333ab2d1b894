//! # cafe-supabase
//!
//! Supabase record store for the CafeRadius backend.
//!
//! Talks to the project's PostgREST endpoint (`/rest/v1`) directly:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `list_cafes` | `GET /cafes?select=*` |
//! | `insert_voucher` | `POST /vouchers?select=*` with `Prefer: return=representation` |
//! | `find_voucher` | `GET /vouchers?select=*,cafes(*)&code=eq.<code>` as a single object |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cafe_supabase::SupabaseRecordStore;
//! use cafe_core::RecordStore;
//!
//! // Reads SUPABASE_URL / SUPABASE_KEY
//! let store = SupabaseRecordStore::from_env()?;
//! let cafes = store.list_cafes().await?;
//! ```

pub mod config;
pub mod store;

// Re-exports
pub use config::SupabaseConfig;
pub use store::{singular_row_count, SupabaseRecordStore, CAFES_TABLE, VOUCHERS_TABLE};
