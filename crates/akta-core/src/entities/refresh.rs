use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::answer::AnswerError;
use crate::enums::RefreshStatus;

/// Result of refreshing one tracked source.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SourceOutcome {
    pub source_url: String,
    pub status: RefreshStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AnswerError>,
}

impl SourceOutcome {
    #[must_use]
    pub fn failed(source_url: impl Into<String>, error: AnswerError) -> Self {
        Self {
            source_url: source_url.into(),
            status: RefreshStatus::Failed,
            document_id: None,
            chunk_count: None,
            error: Some(error),
        }
    }
}

/// Report of one refresh pass over the tracked sources.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RefreshReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<SourceOutcome>,
}

impl RefreshReport {
    /// Number of outcomes with the given status.
    #[must_use]
    pub fn count(&self, status: RefreshStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.count(RefreshStatus::Failed) > 0
    }
}
