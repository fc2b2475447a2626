//! Dashboard aggregates

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use sqlx::FromRow;

use super::{
    AnnouncementWithAuthor, Club, ClubSummary, EventSummary, RegisteredEvent, User,
};

#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboard {
    pub profile: User,
    pub clubs: Vec<ClubSummary>,
    pub administered_club_ids: Vec<i64>,
    pub upcoming_registrations: Vec<RegisteredEvent>,
    pub recent_announcements: Vec<AnnouncementWithAuthor>,
    pub unread_notifications: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GrowthPoint {
    pub day: NaiveDate,
    pub joined: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClubDashboard {
    pub club: Club,
    pub member_count: i64,
    pub admin_count: i64,
    pub pending_collaborations: i64,
    pub upcoming_events: Vec<EventSummary>,
    pub recent_announcements: Vec<AnnouncementWithAuthor>,
    pub member_growth: Vec<GrowthPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SystemStats {
    pub total_users: i64,
    pub active_users: i64,
    pub pending_clubs: i64,
    pub approved_clubs: i64,
    pub rejected_clubs: i64,
    pub total_events: i64,
    pub upcoming_events: i64,
    pub active_registrations: i64,
    pub pending_collaborations: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemDashboard {
    pub stats: SystemStats,
    pub pending_clubs: Vec<ClubSummary>,
    pub newest_users: Vec<User>,
}
