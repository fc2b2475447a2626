//! Club announcement model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "announcement_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl AnnouncementPriority {
    /// High and urgent announcements are pushed to members as notifications
    pub fn notifies_members(&self) -> bool {
        matches!(self, AnnouncementPriority::High | AnnouncementPriority::Urgent)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    pub id: i64,
    pub club_id: i64,
    pub author_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub priority: AnnouncementPriority,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnnouncementWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub announcement: Announcement,
    pub author_name: Option<String>,
    pub club_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub content: String,
    pub priority: Option<AnnouncementPriority>,
    pub is_pinned: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAnnouncementRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub priority: Option<AnnouncementPriority>,
    pub is_pinned: Option<bool>,
}
