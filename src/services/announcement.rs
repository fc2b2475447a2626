//! Club announcement service

use tracing::debug;
use crate::database::repositories::{AnnouncementRepository, ClubRepository};
use crate::models::{
    Announcement, AnnouncementWithAuthor, CreateAnnouncementRequest, NotificationKind,
    UpdateAnnouncementRequest,
};
use crate::services::auth::AuthService;
use crate::services::club::ClubService;
use crate::services::notification::NotificationService;
use crate::utils::errors::{ClubHubError, Result};
use crate::utils::helpers;
use crate::utils::logging::log_club_event;

const RECENT_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct AnnouncementService {
    announcements: AnnouncementRepository,
    clubs: ClubRepository,
    club_service: ClubService,
    auth: AuthService,
    notifications: NotificationService,
}

impl AnnouncementService {
    pub fn new(
        announcements: AnnouncementRepository,
        clubs: ClubRepository,
        club_service: ClubService,
        auth: AuthService,
        notifications: NotificationService,
    ) -> Self {
        Self { announcements, clubs, club_service, auth, notifications }
    }

    async fn announcement(&self, id: i64) -> Result<Announcement> {
        self.announcements
            .find_by_id(id)
            .await?
            .ok_or_else(|| ClubHubError::not_found("announcement", id))
    }

    /// Post an announcement (club admin); high and urgent ones reach every member
    pub async fn create(&self, user_id: i64, club_id: i64, request: CreateAnnouncementRequest) -> Result<Announcement> {
        let club = self.club_service.club(club_id).await?;
        self.auth.require_club_admin(user_id, club_id).await?;

        let title = helpers::require_text("Title", &request.title, 3, 150)?;
        let content = helpers::require_text("Content", &request.content, 1, 5000)?;
        let priority = request.priority.unwrap_or_default();

        let announcement = self
            .announcements
            .create(club_id, user_id, title, content, priority, request.is_pinned.unwrap_or(false))
            .await?;

        log_club_event(club_id, "announcement_posted", Some(user_id), Some(&announcement.title));

        if priority.notifies_members() {
            let members: Vec<i64> = self
                .clubs
                .member_ids(club_id)
                .await
                .unwrap_or_default()
                .into_iter()
                .filter(|id| *id != user_id)
                .collect();
            let preview = helpers::truncate_text(&announcement.content, 200);
            self.notifications
                .broadcast(
                    &members,
                    NotificationKind::Announcement,
                    &[
                        ("club_name", club.name.as_str()),
                        ("title", announcement.title.as_str()),
                        ("content", preview.as_str()),
                    ],
                    Some(format!("/clubs/{}/announcements", club_id)),
                )
                .await;
        }

        Ok(announcement)
    }

    /// Pinned first, then newest; same visibility as the club itself
    pub async fn list(&self, viewer: Option<i64>, club_id: i64) -> Result<Vec<AnnouncementWithAuthor>> {
        self.club_service.get(club_id, viewer).await?;
        self.announcements.list_for_club(club_id).await
    }

    pub async fn update(&self, user_id: i64, id: i64, request: UpdateAnnouncementRequest) -> Result<Announcement> {
        let existing = self.announcement(id).await?;
        self.auth.require_club_admin(user_id, existing.club_id).await?;

        let request = UpdateAnnouncementRequest {
            title: match request.title.as_deref() {
                Some(t) => Some(helpers::require_text("Title", t, 3, 150)?),
                None => None,
            },
            content: match request.content.as_deref() {
                Some(c) => Some(helpers::require_text("Content", c, 1, 5000)?),
                None => None,
            },
            ..request
        };

        let announcement = self.announcements.update(id, request).await?;
        debug!(announcement_id = id, user_id = user_id, "Announcement updated");
        Ok(announcement)
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<()> {
        let existing = self.announcement(id).await?;
        self.auth.require_club_admin(user_id, existing.club_id).await?;

        if !self.announcements.delete(id).await? {
            return Err(ClubHubError::not_found("announcement", id));
        }
        log_club_event(existing.club_id, "announcement_deleted", Some(user_id), None);
        Ok(())
    }

    /// Latest announcements across the caller's clubs
    pub async fn recent_for_user(&self, user_id: i64) -> Result<Vec<AnnouncementWithAuthor>> {
        self.announcements.recent_for_user(user_id, RECENT_LIMIT).await
    }
}
