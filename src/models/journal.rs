use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DreamEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub text: String,
}
