use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A completed AI analysis, as stored in `resume_analyses`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub target: String,
    pub source_name: String,
    pub input_chars: i32,
    pub output: String,
    pub created_at: DateTime<Utc>,
}
