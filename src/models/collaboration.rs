//! Club collaboration request model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "collaboration_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CollaborationStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl CollaborationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaborationStatus::Pending => "pending",
            CollaborationStatus::Accepted => "accepted",
            CollaborationStatus::Rejected => "rejected",
            CollaborationStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Collaboration {
    pub id: i64,
    pub requester_club_id: i64,
    pub target_club_id: i64,
    pub title: String,
    pub message: Option<String>,
    pub status: CollaborationStatus,
    pub requested_by: Option<i64>,
    pub responded_by: Option<i64>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Collaboration joined with both club names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CollaborationWithClubs {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub collaboration: Collaboration,
    pub requester_club_name: String,
    pub target_club_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollaborationRequest {
    pub target_club_id: i64,
    pub title: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollaborationFilter {
    pub status: Option<CollaborationStatus>,
}
