//! Club, membership and club admin models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Fixed list of club categories
pub const CLUB_CATEGORIES: &[&str] = &[
    "Academic",
    "Arts",
    "Cultural",
    "Professional",
    "Recreation",
    "Service",
    "Social",
    "Sports",
    "Technology",
    "Other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "club_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClubStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClubStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClubStatus::Pending => "pending",
            ClubStatus::Approved => "approved",
            ClubStatus::Rejected => "rejected",
        }
    }
}

/// Role of a member inside one club
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Member,
    Officer,
    President,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub university_id: Option<i64>,
    pub status: ClubStatus,
    pub logo_url: Option<String>,
    pub contact_email: Option<String>,
    pub meeting_schedule: Option<String>,
    pub social_links: serde_json::Value,
    pub tags: Vec<String>,
    pub created_by: Option<i64>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Club row joined with directory information
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClubSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub club: Club,
    pub university_name: Option<String>,
    pub member_count: i64,
    pub event_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClubMember {
    pub id: i64,
    pub club_id: i64,
    pub user_id: i64,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

/// Member row joined with the member's profile
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberWithProfile {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub student_id: Option<String>,
    pub role: MemberRole,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClubAdmin {
    pub id: i64,
    pub club_id: i64,
    pub user_id: i64,
    pub granted_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateClubRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub university_id: Option<i64>,
    pub logo_url: Option<String>,
    pub contact_email: Option<String>,
    pub meeting_schedule: Option<String>,
    pub social_links: Option<serde_json::Value>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClubRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub logo_url: Option<String>,
    pub contact_email: Option<String>,
    pub meeting_schedule: Option<String>,
    pub social_links: Option<serde_json::Value>,
    pub tags: Option<Vec<String>>,
}

/// Directory query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClubFilter {
    pub university_id: Option<i64>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Outcome of a system admin review
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject { reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectClubRequest {
    pub reason: Option<String>,
}

/// What the caller's join/leave control renders from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipStatus {
    pub club_id: i64,
    pub is_member: bool,
    pub is_admin: bool,
    pub role: Option<MemberRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: MemberRole,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberFilter {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}
