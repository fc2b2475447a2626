//! Club activity post model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityPost {
    pub id: i64,
    pub club_id: i64,
    pub author_id: Option<i64>,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Post with author, club and like information for one viewer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostWithDetails {
    pub id: i64,
    pub club_id: i64,
    pub club_name: String,
    pub club_logo_url: Option<String>,
    pub author_id: Option<i64>,
    pub author_name: Option<String>,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
    pub liked_by_me: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    pub image_url: Option<String>,
}

/// State after a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggle {
    pub post_id: i64,
    pub liked: bool,
    pub like_count: i64,
}
