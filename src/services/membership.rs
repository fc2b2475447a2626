//! Membership service implementation
//!
//! This service handles joining and leaving clubs, member management by club
//! admins, and admin grants. A club never loses its last admin.

use tracing::{debug, info};
use crate::config::settings::Settings;
use crate::database::repositories::{AdminRevocation, ClubRepository, MemberRemoval, UserRepository};
use crate::models::{
    ClubAdmin, ClubMember, ClubStatus, MemberFilter, MemberRole, MemberWithProfile,
    MembershipStatus, NotificationKind,
};
use crate::services::auth::{AuthService, Permission};
use crate::services::club::ClubService;
use crate::services::notification::NotificationService;
use crate::services::redis::{RedisService, CLUB_DIRECTORY_PREFIX};
use crate::utils::errors::{ClubHubError, Result};
use crate::utils::helpers::{self, Page, PageRequest};
use crate::utils::logging::log_club_event;

const LAST_ADMIN: &str = "A club must keep at least one admin";

#[derive(Clone)]
pub struct MembershipService {
    clubs: ClubRepository,
    users: UserRepository,
    club_service: ClubService,
    auth: AuthService,
    notifications: NotificationService,
    redis: RedisService,
    settings: Settings,
}

impl MembershipService {
    pub fn new(
        clubs: ClubRepository,
        users: UserRepository,
        club_service: ClubService,
        auth: AuthService,
        notifications: NotificationService,
        redis: RedisService,
        settings: Settings,
    ) -> Self {
        Self { clubs, users, club_service, auth, notifications, redis, settings }
    }

    /// Join an approved club
    pub async fn join(&self, user_id: i64, club_id: i64) -> Result<ClubMember> {
        let user = self.auth.active_user(user_id).await?;
        let club = self.club_service.club(club_id).await?;

        if club.status != ClubStatus::Approved {
            return Err(ClubHubError::InvalidInput("This club is not accepting members yet".to_string()));
        }
        if self.clubs.is_member(club_id, user_id).await? {
            return Err(ClubHubError::AlreadyMember);
        }

        let member = self
            .clubs
            .add_member(club_id, user_id, MemberRole::Member)
            .await
            .map_err(|e| if e.is_unique_violation() { ClubHubError::AlreadyMember } else { e })?;

        log_club_event(club_id, "member_joined", Some(user_id), None);
        self.redis.invalidate_prefix(CLUB_DIRECTORY_PREFIX).await;

        let admins = self.clubs.admin_ids(club_id).await.unwrap_or_default();
        self.notifications
            .broadcast(
                &admins,
                NotificationKind::MemberJoined,
                &[("club_name", club.name.as_str()), ("member_name", user.full_name.as_str())],
                Some(format!("/clubs/{}/members", club_id)),
            )
            .await;
        self.notifications
            .broadcast(
                &[user_id],
                NotificationKind::ClubJoined,
                &[("club_name", club.name.as_str())],
                Some(format!("/clubs/{}", club_id)),
            )
            .await;

        Ok(member)
    }

    /// Leave a club; the last admin must hand over first
    pub async fn leave(&self, user_id: i64, club_id: i64) -> Result<()> {
        self.club_service.get(club_id, Some(user_id)).await?;
        self.remove(club_id, user_id).await?;
        log_club_event(club_id, "member_left", Some(user_id), None);
        Ok(())
    }

    /// Remove another member (club admin)
    pub async fn remove_member(&self, admin_id: i64, club_id: i64, user_id: i64) -> Result<()> {
        self.club_service.club(club_id).await?;
        self.auth.require_club_admin(admin_id, club_id).await?;
        self.remove(club_id, user_id).await?;
        log_club_event(club_id, "member_removed", Some(admin_id), Some(&user_id.to_string()));
        Ok(())
    }

    async fn remove(&self, club_id: i64, user_id: i64) -> Result<()> {
        match self.clubs.remove_member(club_id, user_id, true).await? {
            MemberRemoval::Removed { was_admin } => {
                if was_admin {
                    self.users.demote_if_no_clubs(user_id).await?;
                }
                self.redis.invalidate_prefix(CLUB_DIRECTORY_PREFIX).await;
                Ok(())
            }
            MemberRemoval::NotMember => Err(ClubHubError::NotMember),
            MemberRemoval::LastAdmin => Err(ClubHubError::Conflict(LAST_ADMIN.to_string())),
        }
    }

    /// Member roster; visible to members and admins
    pub async fn members(&self, viewer_id: i64, club_id: i64, filter: &MemberFilter) -> Result<Page<MemberWithProfile>> {
        self.club_service.club(club_id).await?;
        self.auth.require_permission(viewer_id, Some(club_id), Permission::ClubMember).await?;

        let pagination = PageRequest { page: filter.page, page_size: filter.page_size }
            .resolve(&self.settings.limits);
        let pattern = filter
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(helpers::like_pattern);

        let (items, total) = futures::try_join!(
            self.clubs.list_members(club_id, pattern.as_deref(), pagination.limit(), pagination.offset()),
            self.clubs.count_members(club_id, pattern.as_deref())
        )?;

        Ok(Page::new(items, pagination, total))
    }

    /// Change a member's club role (club admin)
    pub async fn set_member_role(&self, admin_id: i64, club_id: i64, user_id: i64, role: MemberRole) -> Result<ClubMember> {
        self.club_service.club(club_id).await?;
        self.auth.require_club_admin(admin_id, club_id).await?;

        let member = self
            .clubs
            .update_member_role(club_id, user_id, role)
            .await?
            .ok_or(ClubHubError::NotMember)?;

        debug!(club_id = club_id, user_id = user_id, role = ?role, "Member role updated");
        Ok(member)
    }

    /// Make a member an admin of the club
    pub async fn grant_admin(&self, admin_id: i64, club_id: i64, user_id: i64) -> Result<ClubAdmin> {
        let club = self.club_service.club(club_id).await?;
        self.auth.require_club_admin(admin_id, club_id).await?;

        if !self.clubs.is_member(club_id, user_id).await? {
            return Err(ClubHubError::NotMember);
        }
        if self.clubs.is_admin(club_id, user_id).await? {
            return Err(ClubHubError::Conflict("User is already an admin of this club".to_string()));
        }

        let grant = self.clubs.add_admin(club_id, user_id, admin_id).await.map_err(|e| {
            if e.is_unique_violation() {
                ClubHubError::Conflict("User is already an admin of this club".to_string())
            } else {
                e
            }
        })?;

        info!(club_id = club_id, user_id = user_id, granted_by = admin_id, "Club admin granted");
        self.notifications
            .broadcast(
                &[user_id],
                NotificationKind::AdminGranted,
                &[("club_name", club.name.as_str())],
                Some(format!("/clubs/{}/dashboard", club_id)),
            )
            .await;

        Ok(grant)
    }

    /// Revoke an admin grant; the membership itself stays
    pub async fn revoke_admin(&self, admin_id: i64, club_id: i64, user_id: i64) -> Result<()> {
        self.club_service.club(club_id).await?;
        self.auth.require_club_admin(admin_id, club_id).await?;

        match self.clubs.remove_admin(club_id, user_id).await? {
            AdminRevocation::Revoked => {
                self.users.demote_if_no_clubs(user_id).await?;
                info!(club_id = club_id, user_id = user_id, revoked_by = admin_id, "Club admin revoked");
                Ok(())
            }
            AdminRevocation::NotAdmin => Err(ClubHubError::InvalidInput("User is not an admin of this club".to_string())),
            AdminRevocation::LastAdmin => Err(ClubHubError::Conflict(LAST_ADMIN.to_string())),
        }
    }

    /// What the join/leave control renders from
    pub async fn membership_status(&self, user_id: i64, club_id: i64) -> Result<MembershipStatus> {
        self.club_service.get(club_id, Some(user_id)).await?;
        let (member, is_admin) = futures::try_join!(
            self.clubs.find_member(club_id, user_id),
            self.clubs.is_admin(club_id, user_id)
        )?;

        Ok(MembershipStatus {
            club_id,
            is_member: member.is_some(),
            is_admin,
            role: member.map(|m| m.role),
        })
    }
}
