use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A scored chunk returned for one query. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RetrievalResult {
    pub chunk_id: String,
    pub score: f64,
    pub document_id: String,
    pub section_path: Vec<String>,
    /// Passage text, used when assembling the prompt.
    pub text: String,
    /// Fetch time of the owning document version. Breaks score ties.
    pub fetched_at: DateTime<Utc>,
}

impl RetrievalResult {
    /// Breadcrumb rendering of the section path, e.g. `PART XII > 60A. Hours of work`.
    #[must_use]
    pub fn section_label(&self) -> String {
        self.section_path.join(" > ")
    }
}
