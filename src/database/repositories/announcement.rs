//! Club announcement repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::announcement::{
    Announcement, AnnouncementPriority, AnnouncementWithAuthor, UpdateAnnouncementRequest,
};
use crate::utils::errors::ClubHubError;

const ANNOUNCEMENT_COLUMNS: &str = "id, club_id, author_id, title, content, priority, is_pinned, created_at, updated_at";

const WITH_AUTHOR_SELECT: &str = r#"
    SELECT a.id, a.club_id, a.author_id, a.title, a.content, a.priority, a.is_pinned,
           a.created_at, a.updated_at,
           p.full_name AS author_name,
           c.name AS club_name
    FROM club_announcements a
    JOIN clubs c ON c.id = a.club_id
    LEFT JOIN profiles p ON p.id = a.author_id
"#;

#[derive(Clone)]
pub struct AnnouncementRepository {
    pool: PgPool,
}

impl AnnouncementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new announcement
    pub async fn create(&self, club_id: i64, author_id: i64, title: String, content: String, priority: AnnouncementPriority, is_pinned: bool) -> Result<Announcement, ClubHubError> {
        let announcement = sqlx::query_as::<_, Announcement>(&format!(
            r#"
            INSERT INTO club_announcements (club_id, author_id, title, content, priority, is_pinned, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {ANNOUNCEMENT_COLUMNS}
            "#
        ))
        .bind(club_id)
        .bind(author_id)
        .bind(title)
        .bind(content)
        .bind(priority)
        .bind(is_pinned)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(announcement)
    }

    /// Find announcement by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>, ClubHubError> {
        let announcement = sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM club_announcements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(announcement)
    }

    /// Announcements of a club, pinned first then newest
    pub async fn list_for_club(&self, club_id: i64) -> Result<Vec<AnnouncementWithAuthor>, ClubHubError> {
        let announcements = sqlx::query_as::<_, AnnouncementWithAuthor>(&format!(
            "{WITH_AUTHOR_SELECT} WHERE a.club_id = $1 ORDER BY a.is_pinned DESC, a.created_at DESC"
        ))
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(announcements)
    }

    /// Newest announcements across the clubs a user belongs to
    pub async fn recent_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<AnnouncementWithAuthor>, ClubHubError> {
        let announcements = sqlx::query_as::<_, AnnouncementWithAuthor>(&format!(
            r#"{WITH_AUTHOR_SELECT}
            WHERE EXISTS (SELECT 1 FROM club_members m WHERE m.club_id = a.club_id AND m.user_id = $1)
            ORDER BY a.created_at DESC
            LIMIT $2"#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(announcements)
    }

    /// Newest announcements of one club
    pub async fn recent_for_club(&self, club_id: i64, limit: i64) -> Result<Vec<AnnouncementWithAuthor>, ClubHubError> {
        let announcements = sqlx::query_as::<_, AnnouncementWithAuthor>(&format!(
            "{WITH_AUTHOR_SELECT} WHERE a.club_id = $1 ORDER BY a.created_at DESC LIMIT $2"
        ))
        .bind(club_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(announcements)
    }

    /// Update announcement; absent fields keep their value
    pub async fn update(&self, id: i64, request: UpdateAnnouncementRequest) -> Result<Announcement, ClubHubError> {
        let announcement = sqlx::query_as::<_, Announcement>(&format!(
            r#"
            UPDATE club_announcements
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                priority = COALESCE($4, priority),
                is_pinned = COALESCE($5, is_pinned),
                updated_at = $6
            WHERE id = $1
            RETURNING {ANNOUNCEMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.title)
        .bind(request.content)
        .bind(request.priority)
        .bind(request.is_pinned)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(announcement)
    }

    /// Delete announcement
    pub async fn delete(&self, id: i64) -> Result<bool, ClubHubError> {
        let result = sqlx::query("DELETE FROM club_announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
