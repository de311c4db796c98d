use crate::infrastructure::db::DbPool;
use crate::{
    domain::voice::CustomVoice,
    error::{AppError, AppResult},
};
use sqlx::{PgConnection, Postgres, Transaction};
use std::sync::Arc;
use uuid::Uuid;

pub struct CustomVoiceRepository {
    pool: Arc<DbPool>,
}

impl CustomVoiceRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Open a transaction; dropping it without commit rolls back
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Find a user's custom voice by name
    pub async fn find_by_name(&self, user_id: Uuid, name: &str) -> AppResult<Option<CustomVoice>> {
        let pool = self.pool.as_ref();
        let voice = sqlx::query_as::<_, CustomVoice>(
            r#"
            SELECT id, user_id, voice_name, voice_id1, voice_id2, weight1, weight2,
                   storage_path, created_at
            FROM custom_voices
            WHERE user_id = $1 AND voice_name = $2
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(voice)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CustomVoice>> {
        let pool = self.pool.as_ref();
        let voice = sqlx::query_as::<_, CustomVoice>(
            r#"
            SELECT id, user_id, voice_name, voice_id1, voice_id2, weight1, weight2,
                   storage_path, created_at
            FROM custom_voices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(voice)
    }

    /// All custom voices owned by a user, ordered by name
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<CustomVoice>> {
        let pool = self.pool.as_ref();
        let voices = sqlx::query_as::<_, CustomVoice>(
            r#"
            SELECT id, user_id, voice_name, voice_id1, voice_id2, weight1, weight2,
                   storage_path, created_at
            FROM custom_voices
            WHERE user_id = $1
            ORDER BY voice_name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(voices)
    }

    /// Check if a user already owns a voice with this name
    pub async fn name_exists(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
    ) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM custom_voices
                WHERE user_id = $1 AND voice_name = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

        Ok(exists)
    }

    /// Insert a custom voice inside the caller's transaction
    pub async fn create(&self, conn: &mut PgConnection, voice: &CustomVoice) -> AppResult<CustomVoice> {
        let created = sqlx::query_as::<_, CustomVoice>(
            r#"
            INSERT INTO custom_voices (
                id, user_id, voice_name, voice_id1, voice_id2, weight1, weight2,
                storage_path, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, voice_name, voice_id1, voice_id2, weight1, weight2,
                      storage_path, created_at
            "#,
        )
        .bind(voice.id)
        .bind(voice.user_id)
        .bind(&voice.voice_name)
        .bind(&voice.voice_id1)
        .bind(&voice.voice_id2)
        .bind(voice.weight1)
        .bind(voice.weight2)
        .bind(&voice.storage_path)
        .bind(voice.created_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateVoiceName(voice.voice_name.clone());
                }
            }
            AppError::Database(e)
        })?;

        Ok(created)
    }

    /// Delete a custom voice
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            DELETE FROM custom_voices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
