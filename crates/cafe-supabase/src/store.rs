//! # Supabase Record Store
//!
//! `RecordStore` implementation on top of Supabase's PostgREST API.

use crate::config::SupabaseConfig;
use async_trait::async_trait;
use cafe_core::{Cafe, NewVoucher, RecordStore, StoreError, StoreResult, Voucher};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, error, info, instrument};

pub const CAFES_TABLE: &str = "cafes";
pub const VOUCHERS_TABLE: &str = "vouchers";

/// Select list for a voucher with its café embedded
const VOUCHER_WITH_CAFE: &str = "*,cafes(*)";

/// Asks PostgREST for a single object instead of an array
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// PostgREST code for "singular response requested, row count was not 1"
const NOT_SINGULAR: &str = "PGRST116";

/// Record Store backed by a Supabase project
pub struct SupabaseRecordStore {
    config: SupabaseConfig,
    client: Client,
}

impl SupabaseRecordStore {
    /// Create a new store, building the HTTP client from the config
    pub fn new(config: SupabaseConfig) -> StoreResult<Self> {
        let mut builder = Client::builder();

        // Some hosts have no IPv6 route; pin sockets to IPv4 there.
        if config.force_ipv4 {
            builder = builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        }

        let client = builder.build().map_err(|e| {
            StoreError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        info!(
            "Supabase store ready: url={}, ipv4_only={}",
            config.url, config.force_ipv4
        );

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> StoreResult<Self> {
        let config = SupabaseConfig::from_env()?;
        Self::new(config)
    }

    /// Create with a pre-built HTTP client
    pub fn with_client(client: Client, config: SupabaseConfig) -> Self {
        Self { config, client }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.config.rest_url(table))
            .header("apikey", &self.config.api_key)
            .header(AUTHORIZATION, self.config.auth_header())
    }

    async fn execute(request: RequestBuilder) -> StoreResult<(StatusCode, String)> {
        let response: Response = request
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok((status, body))
    }

    fn checked(status: StatusCode, body: String) -> StoreResult<String> {
        if !status.is_success() {
            error!("Supabase API error: status={}, body={}", status, body);
            return Err(rejection(status.as_u16(), &body));
        }
        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: &str) -> StoreResult<T> {
        serde_json::from_str(body).map_err(|e| {
            StoreError::Serialization(format!("Failed to parse Supabase response: {}", e))
        })
    }
}

#[async_trait]
impl RecordStore for SupabaseRecordStore {
    #[instrument(skip(self))]
    async fn list_cafes(&self) -> StoreResult<Vec<Cafe>> {
        let request = self
            .request(Method::GET, CAFES_TABLE)
            .query(&[("select", "*")]);

        let (status, body) = Self::execute(request).await?;
        let body = Self::checked(status, body)?;

        // PostgREST sends `null` for some empty responses
        let cafes: Option<Vec<Cafe>> = Self::decode(&body)?;
        let cafes = cafes.unwrap_or_default();

        debug!("Fetched {} cafes", cafes.len());
        Ok(cafes)
    }

    #[instrument(skip(self, voucher), fields(code = %voucher.code))]
    async fn insert_voucher(&self, voucher: &NewVoucher) -> StoreResult<Voucher> {
        let request = self
            .request(Method::POST, VOUCHERS_TABLE)
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
            .json(&[voucher]);

        let (status, body) = Self::execute(request).await?;
        let body = Self::checked(status, body)?;
        let rows: Vec<Voucher> = Self::decode(&body)?;

        let row = rows.into_iter().next().ok_or(StoreError::EmptyInsert)?;
        info!("Inserted voucher: code={}", row.code);
        Ok(row)
    }

    #[instrument(skip(self))]
    async fn find_voucher(&self, code: &str) -> StoreResult<Voucher> {
        let filter = format!("eq.{}", code);
        let request = self
            .request(Method::GET, VOUCHERS_TABLE)
            .query(&[("select", VOUCHER_WITH_CAFE), ("code", filter.as_str())])
            .header(ACCEPT, SINGLE_OBJECT);

        let (status, body) = Self::execute(request).await?;

        if status == StatusCode::NOT_ACCEPTABLE {
            match singular_row_count(&body) {
                Some(0) => {
                    return Err(StoreError::NotFound {
                        code: code.to_string(),
                    })
                }
                Some(matches) => {
                    return Err(StoreError::Ambiguous {
                        code: code.to_string(),
                        matches,
                    })
                }
                None => {}
            }
        }

        let body = Self::checked(status, body)?;
        Self::decode(&body)
    }

    fn backend_name(&self) -> &'static str {
        "supabase"
    }
}

// =============================================================================
// PostgREST Error Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

fn rejection(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<PostgrestError>(body) {
        Ok(err) => StoreError::Rejected {
            status,
            code: err.code,
            message: err.message,
        },
        Err(_) => StoreError::Rejected {
            status,
            code: None,
            message: format!("HTTP {}: {}", status, body),
        },
    }
}

/// Row count reported by a PostgREST "not exactly one row" error.
///
/// The count is carried in `details`, e.g. `"The result contains 0 rows"`.
pub fn singular_row_count(body: &str) -> Option<usize> {
    let err: PostgrestError = serde_json::from_str(body).ok()?;
    if err.code.as_deref() != Some(NOT_SINGULAR) {
        return None;
    }
    err.details?
        .split_whitespace()
        .find_map(|word| word.parse::<usize>().ok())
}
