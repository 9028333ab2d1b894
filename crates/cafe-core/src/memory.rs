//! # In-Memory Record Store
//!
//! A process-local `RecordStore` with the same observable contract as the
//! hosted store: insert-with-returning, exact-match lookup with the café
//! joined in, and the exactly-one reduction on lookups.

use crate::cafe::Cafe;
use crate::error::{StoreError, StoreResult};
use crate::store::RecordStore;
use crate::voucher::{NewVoucher, Voucher};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    cafes: RwLock<Vec<Cafe>>,
    vouchers: RwLock<Vec<Voucher>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with cafés
    pub fn with_cafes(cafes: impl IntoIterator<Item = Cafe>) -> Self {
        Self {
            cafes: RwLock::new(cafes.into_iter().collect()),
            vouchers: RwLock::new(Vec::new()),
        }
    }

    pub async fn voucher_count(&self) -> usize {
        self.vouchers.read().await.len()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list_cafes(&self) -> StoreResult<Vec<Cafe>> {
        Ok(self.cafes.read().await.clone())
    }

    async fn insert_voucher(&self, voucher: &NewVoucher) -> StoreResult<Voucher> {
        let row = Voucher::from_new(voucher);
        self.vouchers.write().await.push(row.clone());
        debug!("Stored voucher {} in memory", row.code);
        Ok(row)
    }

    async fn find_voucher(&self, code: &str) -> StoreResult<Voucher> {
        let vouchers = self.vouchers.read().await;
        let mut matches = vouchers.iter().filter(|v| v.code == code);

        let found = matches.next().ok_or_else(|| StoreError::NotFound {
            code: code.to_string(),
        })?;

        let extra = matches.count();
        if extra > 0 {
            return Err(StoreError::Ambiguous {
                code: code.to_string(),
                matches: extra + 1,
            });
        }

        let cafes = self.cafes.read().await;
        let cafe = found
            .cafe_id()
            .filter(|id| !id.is_null())
            .and_then(|id| cafes.iter().find(|c| c.id() == Some(id)));

        Ok(found.clone().with_cafe(cafe))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
