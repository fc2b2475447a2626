//! Dashboard service: aggregated views for students, club admins and system admins

use tracing::debug;
use crate::database::DatabaseService;
use crate::models::{ClubDashboard, ClubStatus, StudentDashboard, SystemDashboard};
use crate::services::auth::AuthService;
use crate::utils::errors::{ClubHubError, Result};

const RECENT_ANNOUNCEMENTS: i64 = 5;
const GROWTH_DAYS: i32 = 30;
const NEWEST_USERS: i64 = 10;

#[derive(Clone)]
pub struct DashboardService {
    db: DatabaseService,
    auth: AuthService,
}

impl DashboardService {
    pub fn new(db: DatabaseService, auth: AuthService) -> Self {
        Self { db, auth }
    }

    /// The signed-in student's home view
    pub async fn student(&self, user_id: i64) -> Result<StudentDashboard> {
        let profile = self.auth.active_user(user_id).await?;

        let (clubs, administered_club_ids, upcoming_registrations, recent_announcements, unread_notifications) = futures::try_join!(
            self.db.clubs.user_clubs(user_id),
            self.db.clubs.admin_club_ids(user_id),
            self.db.events.user_registrations(user_id, true),
            self.db.announcements.recent_for_user(user_id, RECENT_ANNOUNCEMENTS),
            self.db.notifications.count(user_id, true)
        )?;

        Ok(StudentDashboard {
            profile,
            clubs,
            administered_club_ids,
            upcoming_registrations,
            recent_announcements,
            unread_notifications,
        })
    }

    /// Management view of one club (club admin)
    pub async fn club(&self, user_id: i64, club_id: i64) -> Result<ClubDashboard> {
        let club = self
            .db
            .clubs
            .find_by_id(club_id)
            .await?
            .ok_or_else(|| ClubHubError::not_found("club", club_id))?;
        self.auth.require_club_admin(user_id, club_id).await?;

        let (member_count, admins, pending_collaborations, upcoming_events, recent_announcements, member_growth) = futures::try_join!(
            self.db.clubs.count_members(club_id, None),
            self.db.clubs.admin_ids(club_id),
            self.db.collaborations.count_pending_incoming(club_id),
            self.db.events.club_events(club_id, false, Some(user_id)),
            self.db.announcements.recent_for_club(club_id, RECENT_ANNOUNCEMENTS),
            self.db.clubs.member_growth(club_id, GROWTH_DAYS)
        )?;

        debug!(club_id = club_id, member_count = member_count, "Club dashboard assembled");

        Ok(ClubDashboard {
            club,
            member_count,
            admin_count: admins.len() as i64,
            pending_collaborations,
            upcoming_events,
            recent_announcements,
            member_growth,
        })
    }

    /// Platform-wide view (system admin)
    pub async fn system(&self, admin_id: i64) -> Result<SystemDashboard> {
        self.auth.require_system_admin(admin_id).await?;

        let (stats, pending_clubs, newest_users) = futures::try_join!(
            self.db.admin.get_stats(),
            self.db.clubs.list_by_status(ClubStatus::Pending),
            self.db.users.newest(NEWEST_USERS)
        )?;

        Ok(SystemDashboard { stats, pending_clubs, newest_users })
    }
}
