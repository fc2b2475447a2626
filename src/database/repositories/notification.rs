//! User notification repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::notification::{CreateNotificationRequest, Notification};
use crate::utils::errors::ClubHubError;

const NOTIFICATION_COLUMNS: &str = "id, user_id, kind, title, message, link, is_read, created_at";

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one notification
    pub async fn create(&self, request: CreateNotificationRequest) -> Result<Notification, ClubHubError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO user_notifications (user_id, kind, title, message, link, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(request.user_id)
        .bind(request.kind)
        .bind(request.title)
        .bind(request.message)
        .bind(request.link)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Insert the same notification for many users in one statement
    pub async fn create_many(&self, user_ids: &[i64], template: &CreateNotificationRequest) -> Result<u64, ClubHubError> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO user_notifications (user_id, kind, title, message, link, is_read, created_at)
            SELECT u, $2, $3, $4, $5, FALSE, $6 FROM UNNEST($1::BIGINT[]) AS u
            "#
        )
        .bind(user_ids)
        .bind(template.kind)
        .bind(&template.title)
        .bind(&template.message)
        .bind(&template.link)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Notifications of a user, newest first
    pub async fn list(&self, user_id: i64, unread_only: bool, limit: i64, offset: i64) -> Result<Vec<Notification>, ClubHubError> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS} FROM user_notifications
            WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Count notifications matching the same filter as `list`
    pub async fn count(&self, user_id: i64, unread_only: bool) -> Result<i64, ClubHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_notifications WHERE user_id = $1 AND (NOT $2 OR NOT is_read)"
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Mark one of the user's notifications read
    pub async fn mark_read(&self, id: i64, user_id: i64) -> Result<Option<Notification>, ClubHubError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "UPDATE user_notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2 RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Mark every unread notification of the user read
    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64, ClubHubError> {
        let result = sqlx::query("UPDATE user_notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete one of the user's notifications
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<bool, ClubHubError> {
        let result = sqlx::query("DELETE FROM user_notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
