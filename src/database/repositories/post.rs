//! Club activity post repository implementation
//!
//! Backs the feed procedures: posts with details, post creation and like toggling.

use sqlx::PgPool;
use chrono::Utc;
use crate::models::post::{ActivityPost, LikeToggle, PostWithDetails};
use crate::utils::errors::ClubHubError;

const POST_COLUMNS: &str = "id, club_id, author_id, content, image_url, created_at";

/// Post select with details; `$1` is the viewer
const DETAILS_SELECT: &str = r#"
    SELECT po.id, po.club_id, c.name AS club_name, c.logo_url AS club_logo_url,
           po.author_id, pr.full_name AS author_name, pr.avatar_url AS author_avatar_url,
           po.content, po.image_url, po.created_at,
           (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = po.id) AS like_count,
           EXISTS (SELECT 1 FROM post_likes l WHERE l.post_id = po.id AND l.user_id = $1::BIGINT) AS liked_by_me
    FROM club_activity_posts po
    JOIN clubs c ON c.id = po.club_id
    LEFT JOIN profiles pr ON pr.id = po.author_id
"#;

#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new post
    pub async fn create(&self, club_id: i64, author_id: i64, content: String, image_url: Option<String>) -> Result<ActivityPost, ClubHubError> {
        let post = sqlx::query_as::<_, ActivityPost>(&format!(
            r#"
            INSERT INTO club_activity_posts (club_id, author_id, content, image_url, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(club_id)
        .bind(author_id)
        .bind(content)
        .bind(image_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    /// Find post by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ActivityPost>, ClubHubError> {
        let post = sqlx::query_as::<_, ActivityPost>(&format!(
            "SELECT {POST_COLUMNS} FROM club_activity_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// One post with details as seen by `viewer`
    pub async fn find_with_details(&self, id: i64, viewer: Option<i64>) -> Result<Option<PostWithDetails>, ClubHubError> {
        let post = sqlx::query_as::<_, PostWithDetails>(&format!("{DETAILS_SELECT} WHERE po.id = $2"))
            .bind(viewer)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    /// Posts of a club, newest first
    pub async fn club_posts(&self, club_id: i64, viewer: Option<i64>, limit: i64, offset: i64) -> Result<Vec<PostWithDetails>, ClubHubError> {
        let posts = sqlx::query_as::<_, PostWithDetails>(&format!(
            "{DETAILS_SELECT} WHERE po.club_id = $2 ORDER BY po.created_at DESC, po.id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(viewer)
        .bind(club_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Count posts of a club
    pub async fn count_club_posts(&self, club_id: i64) -> Result<i64, ClubHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM club_activity_posts WHERE club_id = $1")
            .bind(club_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Posts from every club the user belongs to, newest first
    pub async fn feed_for_user(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<PostWithDetails>, ClubHubError> {
        let posts = sqlx::query_as::<_, PostWithDetails>(&format!(
            r#"{DETAILS_SELECT}
            WHERE EXISTS (SELECT 1 FROM club_members m WHERE m.club_id = po.club_id AND m.user_id = $1)
            ORDER BY po.created_at DESC, po.id DESC
            LIMIT $2 OFFSET $3"#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Count posts in a user's feed
    pub async fn count_feed_for_user(&self, user_id: i64) -> Result<i64, ClubHubError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM club_activity_posts po
            WHERE EXISTS (SELECT 1 FROM club_members m WHERE m.club_id = po.club_id AND m.user_id = $1)
            "#
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Like the post if the user has not, otherwise remove the like
    pub async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<LikeToggle, ClubHubError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let liked = if removed.rows_affected() == 0 {
            sqlx::query(
                "INSERT INTO post_likes (post_id, user_id, created_at) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING"
            )
            .bind(post_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
            true
        } else {
            false
        };

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(LikeToggle { post_id, liked, like_count: count.0 })
    }

    /// Delete post; likes cascade
    pub async fn delete(&self, id: i64) -> Result<bool, ClubHubError> {
        let result = sqlx::query("DELETE FROM club_activity_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
