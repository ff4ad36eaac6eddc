//! Unique identifiers for persisted scan runs.
//!
//! `ReportId` provides type-safe, unique identifiers for stored run records,
//! preventing accidental misuse of string identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for a stored scan run.
///
/// Uses UUID v4 internally for globally unique identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a ReportId from raw bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Get the raw bytes of this ID.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Get a short representation (first 8 characters).
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportId {
    type Err = ReportIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Short prefixes require a store lookup; only full UUIDs parse here.
        if s.len() < 36 {
            return Err(ReportIdError::ShortFormNotSupported);
        }

        let uuid = Uuid::parse_str(s).map_err(|_| ReportIdError::InvalidFormat(s.to_string()))?;
        Ok(Self(uuid))
    }
}

/// Error type for ReportId parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReportIdError {
    #[error("invalid run ID format: {0}")]
    InvalidFormat(String),
    #[error("short form IDs require a store lookup")]
    ShortFormNotSupported,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_id_generation() {
        let id1 = ReportId::new();
        let id2 = ReportId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_report_id_display() {
        let id = ReportId::new();
        let s = id.to_string();
        assert_eq!(s.len(), 36); // UUID format with hyphens
    }

    #[test]
    fn test_report_id_short() {
        let id = ReportId::new();
        assert_eq!(id.short().len(), 8);
    }

    #[test]
    fn test_report_id_roundtrip() {
        let id = ReportId::new();
        let parsed: ReportId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_short_form_rejected() {
        let result = "deadbeef".parse::<ReportId>();
        assert!(matches!(result, Err(ReportIdError::ShortFormNotSupported)));
    }
}
