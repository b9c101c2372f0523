use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A refresh token that has been permanently denylisted.
///
/// Once a token value is present in the store's revocation set it can never
/// verify again, regardless of its signature or expiry. Entries are only
/// dropped by compaction, after the token has expired on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedToken {
    /// The raw token string, exactly as presented by the client.
    pub value: String,
    /// When the revocation was recorded.
    pub revoked_at: DateTime<Utc>,
}

impl RevokedToken {
    /// Record a revocation of `value` at the current instant.
    pub fn now(value: impl Into<String>) -> Self {
        Self::at(value, Utc::now())
    }

    /// Record a revocation of `value` at an explicit instant.
    pub fn at(value: impl Into<String>, revoked_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            revoked_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_serializes_as_rfc3339() {
        let when = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let token = RevokedToken::at("abc.def.ghi", when);
        let json = serde_json::to_string(&token).unwrap();
        assert!(json.contains("2024-05-01T12:00:00Z"));
        let back: RevokedToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}
