use crate::infrastructure::db::DbPool;
use crate::{domain::synthesis::AudioArtifact, error::AppResult};
use std::sync::Arc;
use uuid::Uuid;

pub struct AudioArtifactRepository {
    pool: Arc<DbPool>,
}

impl AudioArtifactRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Record a generated audio file
    pub async fn create(&self, artifact: &AudioArtifact) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            INSERT INTO audio_artifacts (id, user_id, prompt, voice, speed, storage_path, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(artifact.id)
        .bind(artifact.user_id)
        .bind(&artifact.prompt)
        .bind(&artifact.voice)
        .bind(artifact.speed)
        .bind(&artifact.storage_path)
        .bind(artifact.created_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Most recent audio artifacts of a user, newest first
    pub async fn find_recent_by_user(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<AudioArtifact>> {
        let pool = self.pool.as_ref();
        let artifacts = sqlx::query_as::<_, AudioArtifact>(
            r#"
            SELECT id, user_id, prompt, voice, speed, storage_path, created_at
            FROM audio_artifacts
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(artifacts)
    }
}
