//! # Application State
//!
//! Shared state for the Axum application: configuration and the Record
//! Store handle, built once at startup and shared read-only by every handler.

use anyhow::Context;
use cafe_core::{Cafe, MemoryRecordStore, SharedRecordStore};
use cafe_supabase::SupabaseRecordStore;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Which Record Store implementation backs the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Hosted Supabase project (default)
    Supabase,
    /// Process-local store, for local runs
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "supabase" => Ok(StoreBackend::Supabase),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("Unknown RECORD_STORE: {}", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// `NODE_ENV`, reported verbatim by `/api/debug`
    pub node_env: Option<String>,
    /// Whether `SUPABASE_URL` is set to a non-empty value
    pub has_supabase_url: bool,
    /// Whether `SUPABASE_KEY` is set to a non-empty value
    pub has_supabase_key: bool,
    /// Record Store backend
    pub store_backend: StoreBackend,
    /// Reject expired vouchers on verification
    pub enforce_expiry: bool,
    /// JSON file of café rows to seed the memory store with
    pub memory_cafes_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let present = |name: &str| lookup(name).is_some_and(|v| !v.is_empty());

        let port = match lookup("PORT") {
            Some(p) => p.parse().with_context(|| format!("Invalid PORT: {}", p))?,
            None => 3000,
        };

        let store_backend = match lookup("RECORD_STORE") {
            Some(b) => b.parse()?,
            None => StoreBackend::Supabase,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            node_env: lookup("NODE_ENV"),
            has_supabase_url: present("SUPABASE_URL"),
            has_supabase_key: present("SUPABASE_KEY"),
            store_backend,
            enforce_expiry: lookup("VOUCHER_ENFORCE_EXPIRY")
                .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
            memory_cafes_file: lookup("MEMORY_CAFES_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Environment name for logs
    pub fn environment(&self) -> &str {
        self.node_env.as_deref().unwrap_or("development")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment() == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Record Store handle
    pub store: SharedRecordStore,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build the configured Record Store
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store: SharedRecordStore = match config.store_backend {
            StoreBackend::Supabase => {
                let store = SupabaseRecordStore::from_env()
                    .map_err(|e| anyhow::anyhow!("Failed to initialize Supabase: {}", e))?;
                Arc::new(store)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory record store, data is lost on restart");
                let cafes = match &config.memory_cafes_file {
                    Some(path) => load_seed_cafes(path)?,
                    None => Vec::new(),
                };
                Arc::new(MemoryRecordStore::with_cafes(cafes))
            }
        };

        Ok(Self::with_store(config, store))
    }

    /// Create state around an existing store
    pub fn with_store(config: AppConfig, store: SharedRecordStore) -> Self {
        Self { store, config }
    }
}

/// Read café rows for the memory store from a JSON array file
fn load_seed_cafes(path: &Path) -> anyhow::Result<Vec<Cafe>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cafes: Vec<Cafe> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
    tracing::info!("Loaded {} cafes from {}", cafes.len(), path.display());
    Ok(cafes)
}
