//! Repositorio de notificaciones

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::notification::Notification;
use crate::utils::errors::AppError;

pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        r#type: &str,
        title: &str,
        message: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, type, title, message, metadata, is_read, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(r#type)
        .bind(title)
        .bind(message)
        .bind(metadata)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Inserta en bloque las filas de un broadcast (una transacción)
    pub async fn create_many(
        &self,
        user_ids: &[Uuid],
        r#type: &str,
        title: &str,
        message: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        for user_id in user_ids {
            sqlx::query(
                r#"
                INSERT INTO notifications (id, user_id, type, title, message, metadata, is_read, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $7)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(r#type)
            .bind(title)
            .bind(message)
            .bind(metadata.clone())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(user_ids.len())
    }

    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        is_read: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notification>, i64), AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1 AND ($2::bool IS NULL OR is_read = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(is_read)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND ($2::bool IS NULL OR is_read = $2)",
        )
        .bind(user_id)
        .bind(is_read)
        .fetch_one(&self.pool)
        .await?;

        Ok((notifications, total.0))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn list_all(
        &self,
        r#type: Option<&str>,
        is_read: Option<bool>,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notification>, i64), AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE ($1::text IS NULL OR type = $1)
              AND ($2::bool IS NULL OR is_read = $2)
              AND ($3::uuid IS NULL OR user_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(r#type)
        .bind(is_read)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM notifications
            WHERE ($1::text IS NULL OR type = $1)
              AND ($2::bool IS NULL OR is_read = $2)
              AND ($3::uuid IS NULL OR user_id = $3)
            "#,
        )
        .bind(r#type)
        .bind(is_read)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((notifications, total.0))
    }

    pub async fn mark_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE, updated_at = $3
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
