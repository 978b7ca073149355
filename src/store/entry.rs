//! # Entrada del Store
//! src/store/entry.rs

use crate::fingerprint::{fingerprint, FingerprintError};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Payload más la fecha de su última mutación
///
/// El fingerprint no se guarda: se recalcula del payload cada vez, así que
/// nunca puede quedar desincronizado.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    pub payload: Value,
    pub modified_at: DateTime<Utc>,
}

impl ResourceEntry {
    pub fn new(payload: Value, modified_at: DateTime<Utc>) -> Self {
        Self { payload, modified_at }
    }

    /// Versión actual del payload (valor del ETag sin comillas)
    pub fn fingerprint(&self) -> Result<String, FingerprintError> {
        fingerprint(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_fingerprint_ignores_modified_at() {
        let now = Utc::now();
        let a = ResourceEntry::new(json!({"title": "Dune"}), now);
        let b = ResourceEntry::new(json!({"title": "Dune"}), now - Duration::days(3));

        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_fingerprint_matches_payload() {
        let payload = json!({"title": "Sapiens", "ratings": 10});
        let entry = ResourceEntry::new(payload.clone(), Utc::now());

        assert_eq!(entry.fingerprint().unwrap(), fingerprint(&payload).unwrap());
    }
}
