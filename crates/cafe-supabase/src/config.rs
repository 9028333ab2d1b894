//! # Supabase Configuration
//!
//! Connection settings for the hosted Record Store.
//! Secrets are loaded from environment variables.

use cafe_core::StoreError;
use std::env;

/// Supabase project configuration
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (https://<ref>.supabase.co)
    pub url: String,

    /// API key (anon or service role)
    pub api_key: String,

    /// Bind outbound sockets to IPv4 only
    pub force_ipv4: bool,
}

impl SupabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `SUPABASE_URL`
    /// - `SUPABASE_KEY`
    ///
    /// Optional:
    /// - `SUPABASE_FORCE_IPV4` (`true`/`1`)
    pub fn from_env() -> Result<Self, StoreError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let url = lookup("SUPABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| StoreError::Configuration("SUPABASE_URL not set".to_string()))?;

        let api_key = lookup("SUPABASE_KEY")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| StoreError::Configuration("SUPABASE_KEY not set".to_string()))?;

        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(StoreError::Configuration(
                "SUPABASE_URL must start with https:// or http://".to_string(),
            ));
        }

        let force_ipv4 = lookup("SUPABASE_FORCE_IPV4")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            url,
            api_key,
            force_ipv4,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            force_ipv4: false,
        }
    }

    /// REST endpoint for a table
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), table)
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Builder: restrict outbound connections to IPv4
    pub fn with_force_ipv4(mut self, force_ipv4: bool) -> Self {
        self.force_ipv4 = force_ipv4;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_rest_url() {
        let config = SupabaseConfig::new("https://abc.supabase.co/", "key");
        assert_eq!(
            config.rest_url("vouchers"),
            "https://abc.supabase.co/rest/v1/vouchers"
        );
    }

    #[test]
    fn test_auth_header() {
        let config = SupabaseConfig::new("https://abc.supabase.co", "anon-key");
        assert_eq!(config.auth_header(), "Bearer anon-key");
    }

    #[test]
    fn test_from_lookup() {
        let config = SupabaseConfig::from_lookup(lookup_from(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_KEY", "anon-key"),
            ("SUPABASE_FORCE_IPV4", "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://abc.supabase.co");
        assert_eq!(config.api_key, "anon-key");
        assert!(config.force_ipv4);
    }

    #[test]
    fn test_missing_or_empty_values() {
        let missing_key =
            SupabaseConfig::from_lookup(lookup_from(&[("SUPABASE_URL", "https://abc.supabase.co")]));
        assert!(matches!(missing_key, Err(StoreError::Configuration(_))));

        let empty_url = SupabaseConfig::from_lookup(lookup_from(&[
            ("SUPABASE_URL", ""),
            ("SUPABASE_KEY", "anon-key"),
        ]));
        assert!(matches!(empty_url, Err(StoreError::Configuration(_))));
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        let result = SupabaseConfig::from_lookup(lookup_from(&[
            ("SUPABASE_URL", "abc.supabase.co"),
            ("SUPABASE_KEY", "anon-key"),
        ]));
        assert!(result.is_err());
    }
}
