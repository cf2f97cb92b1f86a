use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One `(user_id, job_id, timestamp)` row of the shown-history log.
///
/// The timestamp is kept as written so rows produced by other tools (naive
/// ISO-8601 without an offset) still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShownRecord {
    pub user_id: String,
    pub job_id: String,
    pub timestamp: String,
}

impl ShownRecord {
    /// Record stamped with the current UTC time (RFC 3339, microseconds).
    pub fn now(user_id: &str, job_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            job_id: job_id.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    /// Parsed timestamp, if it carries an offset.
    pub fn shown_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}
