//! # Voucher Types
//!
//! Voucher codes, the insert payload handed to the Record Store, and the
//! voucher rows it hands back.

use crate::cafe::Cafe;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Fixed prefix of every voucher code
pub const CODE_PREFIX: &str = "CAFE";

/// Number of random characters after the prefix
pub const CODE_SUFFIX_LEN: usize = 4;

/// How long a voucher stays valid after issuance
pub const VOUCHER_VALIDITY_HOURS: i64 = 24;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

// Low 62 bits of a v4 UUID are fully random (version and variant bits sit above).
const RANDOM_BITS_MASK: u128 = (1u128 << 62) - 1;

/// Validity window as a chrono duration
pub fn voucher_validity() -> Duration {
    Duration::hours(VOUCHER_VALIDITY_HOURS)
}

/// A voucher code: `CAFE` followed by four base-36 characters.
///
/// Codes are random, not unique. Two issuances can produce the same code;
/// only a uniqueness constraint in the store prevents that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoucherCode(String);

impl VoucherCode {
    /// Generate a fresh random code
    pub fn generate() -> Self {
        Self::from_entropy(Uuid::new_v4().as_u128() & RANDOM_BITS_MASK)
    }

    /// Build a code from the given random bits (base-36 digits, upper-cased)
    pub fn from_entropy(mut bits: u128) -> Self {
        let mut code = String::with_capacity(CODE_PREFIX.len() + CODE_SUFFIX_LEN);
        code.push_str(CODE_PREFIX);
        for _ in 0..CODE_SUFFIX_LEN {
            code.push(BASE36[(bits % 36) as usize] as char);
            bits /= 36;
        }
        Self(code)
    }

    /// Check whether a string has the shape of an issued code
    pub fn is_well_formed(candidate: &str) -> bool {
        candidate.len() == CODE_PREFIX.len() + CODE_SUFFIX_LEN
            && candidate.starts_with(CODE_PREFIX)
            && candidate[CODE_PREFIX.len()..]
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoucherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VoucherCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Insert payload for a new voucher.
///
/// `cafe_id` and `device_id` are whatever the caller sent: `None` means the
/// key was absent and is left out of the payload, `Some(Value::Null)` is an
/// explicit `null` and is sent as such.
#[derive(Debug, Clone, Serialize)]
pub struct NewVoucher {
    pub code: VoucherCode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cafe_id: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<Value>,

    pub valid_until: DateTime<Utc>,
}

impl NewVoucher {
    /// Issue a voucher valid for 24 hours from now
    pub fn issue(cafe_id: Option<Value>, device_id: Option<Value>) -> Self {
        Self::issue_at(cafe_id, device_id, Utc::now())
    }

    /// Issue a voucher valid for 24 hours from `issued_at`
    pub fn issue_at(
        cafe_id: Option<Value>,
        device_id: Option<Value>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code: VoucherCode::generate(),
            cafe_id,
            device_id,
            valid_until: issued_at + voucher_validity(),
        }
    }
}

/// A voucher row as returned by the Record Store.
///
/// Only `code` is typed; every other column, including an embedded `cafes`
/// join, is kept exactly as the store returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    pub code: String,

    #[serde(flatten)]
    pub columns: Map<String, Value>,
}

impl Voucher {
    /// Row shape a store produces for a freshly inserted voucher
    pub fn from_new(new: &NewVoucher) -> Self {
        let mut columns = Map::new();
        if let Some(cafe_id) = &new.cafe_id {
            columns.insert("cafe_id".into(), cafe_id.clone());
        }
        if let Some(device_id) = &new.device_id {
            columns.insert("device_id".into(), device_id.clone());
        }
        columns.insert(
            "valid_until".into(),
            Value::String(new.valid_until.to_rfc3339()),
        );
        Self {
            code: new.code.to_string(),
            columns,
        }
    }

    pub fn cafe_id(&self) -> Option<&Value> {
        self.columns.get("cafe_id")
    }

    pub fn device_id(&self) -> Option<&Value> {
        self.columns.get("device_id")
    }

    /// Parsed `valid_until`.
    ///
    /// Accepts RFC 3339 timestamps and offset-less timestamps (read as UTC).
    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        let raw = self.columns.get("valid_until")?.as_str()?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// True once `valid_until` lies before `now`. Unparseable timestamps never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_until().is_some_and(|until| until < now)
    }

    /// Embedded café from a `cafes(*)` join, if present and non-null
    pub fn cafe(&self) -> Option<Cafe> {
        self.columns
            .get("cafes")
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Builder: embed the joined café (`None` embeds `null`)
    pub fn with_cafe(mut self, cafe: Option<&Cafe>) -> Self {
        let embedded = cafe
            .and_then(|c| serde_json::to_value(c).ok())
            .unwrap_or(Value::Null);
        self.columns.insert("cafes".into(), embedded);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..500 {
            let code = VoucherCode::generate();
            assert!(
                VoucherCode::is_well_formed(code.as_str()),
                "bad code: {}",
                code
            );
        }
    }

    #[test]
    fn test_code_from_entropy() {
        assert_eq!(VoucherCode::from_entropy(0).as_str(), "CAFE0000");
        assert_eq!(VoucherCode::from_entropy(35).as_str(), "CAFEZ000");
        // 36^4 - 1 fills every digit
        assert_eq!(VoucherCode::from_entropy(1_679_615).as_str(), "CAFEZZZZ");
    }

    #[test]
    fn test_is_well_formed() {
        assert!(VoucherCode::is_well_formed("CAFE9XQ2"));
        assert!(!VoucherCode::is_well_formed("CAFE9xq2"));
        assert!(!VoucherCode::is_well_formed("CAFE9XQ"));
        assert!(!VoucherCode::is_well_formed("CAFE9XQ21"));
        assert!(!VoucherCode::is_well_formed("TEEE9XQ2"));
        assert!(!VoucherCode::is_well_formed("CAFE-XQ2"));
    }

    #[test]
    fn test_issue_sets_24h_validity() {
        let issued_at = Utc::now();
        let voucher = NewVoucher::issue_at(Some(json!("c1")), Some(json!("d1")), issued_at);
        assert_eq!(voucher.valid_until - issued_at, Duration::hours(24));
    }

    #[test]
    fn test_absent_fields_are_not_serialized() {
        let voucher = NewVoucher::issue(None, Some(json!("d1")));
        let body = serde_json::to_value(&voucher).unwrap();
        let obj = body.as_object().unwrap();

        assert!(!obj.contains_key("cafe_id"));
        assert_eq!(obj["device_id"], json!("d1"));
        assert!(obj["code"].as_str().unwrap().starts_with("CAFE"));
        assert!(obj.contains_key("valid_until"));
    }

    #[test]
    fn test_explicit_null_is_serialized() {
        let voucher = NewVoucher::issue(Some(Value::Null), None);
        let body = serde_json::to_value(&voucher).unwrap();
        let obj = body.as_object().unwrap();

        assert_eq!(obj.get("cafe_id"), Some(&Value::Null));
        assert!(!obj.contains_key("device_id"));

        let row = Voucher::from_new(&voucher);
        assert_eq!(row.cafe_id(), Some(&Value::Null));
    }

    #[test]
    fn test_row_passthrough_with_join() {
        let raw = json!({
            "id": 12,
            "code": "CAFEAB12",
            "cafe_id": 3,
            "device_id": "device-9",
            "valid_until": "2026-10-19T08:00:00.000+00:00",
            "created_at": "2026-10-18T08:00:00.000+00:00",
            "cafes": { "id": 3, "name": "Bohne & Blatt" }
        });

        let voucher: Voucher = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(voucher.code, "CAFEAB12");
        assert_eq!(voucher.cafe_id(), Some(&json!(3)));
        assert_eq!(voucher.cafe().unwrap().name(), Some("Bohne & Blatt"));
        assert_eq!(serde_json::to_value(&voucher).unwrap(), raw);
    }

    #[test]
    fn test_valid_until_formats() {
        let mut voucher = Voucher {
            code: "CAFE0000".into(),
            columns: Map::new(),
        };
        assert!(voucher.valid_until().is_none());

        voucher
            .columns
            .insert("valid_until".into(), json!("2026-10-19T08:00:00.5"));
        let parsed = voucher.valid_until().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-10-19T08:00:00.500+00:00");
    }

    #[test]
    fn test_expiry() {
        let issued_at = Utc::now();
        let voucher = Voucher::from_new(&NewVoucher::issue_at(None, None, issued_at));

        assert!(!voucher.is_expired_at(issued_at + Duration::hours(23)));
        assert!(voucher.is_expired_at(issued_at + Duration::hours(25)));
    }

    #[test]
    fn test_null_join_is_kept() {
        let voucher = Voucher::from_new(&NewVoucher::issue(None, None)).with_cafe(None);
        assert!(voucher.cafe().is_none());
        assert_eq!(voucher.columns.get("cafes"), Some(&Value::Null));
    }
}
