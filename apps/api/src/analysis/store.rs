use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::AnalysisRow;

/// Fields of an analysis about to be stored.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub target: String,
    pub source_name: String,
    pub input_chars: i32,
    pub output: String,
}

/// Insert/query access to stored analyses. `AppState` carries it as
/// `Arc<dyn AnalysisStore>` so handlers can be tested without Postgres.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn insert(&self, analysis: NewAnalysis) -> Result<AnalysisRow, AppError>;
    async fn get(&self, id: Uuid) -> Result<Option<AnalysisRow>, AppError>;
}

pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn insert(&self, analysis: NewAnalysis) -> Result<AnalysisRow, AppError> {
        let row = sqlx::query_as::<_, AnalysisRow>(
            r#"
            INSERT INTO resume_analyses (id, target, source_name, input_chars, output)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&analysis.target)
        .bind(&analysis.source_name)
        .bind(analysis.input_chars)
        .bind(&analysis.output)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<AnalysisRow>, AppError> {
        let row = sqlx::query_as::<_, AnalysisRow>("SELECT * FROM resume_analyses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[cfg(test)]
pub use memory::MemoryAnalysisStore;

#[cfg(test)]
mod memory {
    use std::collections::HashMap;

    use tokio::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryAnalysisStore {
        rows: Mutex<HashMap<Uuid, AnalysisRow>>,
    }

    impl MemoryAnalysisStore {
        pub async fn len(&self) -> usize {
            self.rows.lock().await.len()
        }
    }

    #[async_trait]
    impl AnalysisStore for MemoryAnalysisStore {
        async fn insert(&self, analysis: NewAnalysis) -> Result<AnalysisRow, AppError> {
            let row = AnalysisRow {
                id: Uuid::new_v4(),
                target: analysis.target,
                source_name: analysis.source_name,
                input_chars: analysis.input_chars,
                output: analysis.output,
                created_at: chrono::Utc::now(),
            };
            self.rows.lock().await.insert(row.id, row.clone());
            Ok(row)
        }

        async fn get(&self, id: Uuid) -> Result<Option<AnalysisRow>, AppError> {
            Ok(self.rows.lock().await.get(&id).cloned())
        }
    }
}
