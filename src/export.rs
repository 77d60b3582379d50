//! Session snapshot handed to the export collaborator.

use crate::error::ExportError;
use serde::{Deserialize, Serialize};

/// Results of a session, with the "no samples yet" minimum already
/// reported as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    /// Session start, RFC 3339.
    pub session_start: String,
    pub session_duration_seconds: u64,
    pub tests_completed: u32,
    pub max_rate: u32,
    pub min_rate: u32,
    pub avg_rate: u32,
    pub current_rate: u32,
}

impl ExportSnapshot {
    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> ExportSnapshot {
        ExportSnapshot {
            session_start: "2024-01-15T10:30:00Z".to_string(),
            session_duration_seconds: 125,
            tests_completed: 7,
            max_rate: 395,
            min_rate: 0,
            avg_rate: 388,
            current_rate: 390,
        }
    }

    #[test]
    fn test_snapshot_uses_camel_case_keys() {
        let json = sample_snapshot().to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["sessionStart"], "2024-01-15T10:30:00Z");
        assert_eq!(value["sessionDurationSeconds"], 125);
        assert_eq!(value["testsCompleted"], 7);
        assert_eq!(value["maxRate"], 395);
        assert_eq!(value["minRate"], 0);
        assert_eq!(value["avgRate"], 388);
        assert_eq!(value["currentRate"], 390);
        assert_eq!(value.as_object().map(|o| o.len()), Some(7));
    }
}
