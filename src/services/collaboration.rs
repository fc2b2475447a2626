//! Collaboration service implementation
//!
//! Club-to-club collaboration requests. Only one request per pair of clubs
//! may be pending at a time, in either direction.

use tracing::info;
use crate::config::settings::Settings;
use crate::database::repositories::{ClubRepository, CollaborationRepository};
use crate::models::{
    ClubStatus, Collaboration, CollaborationFilter, CollaborationStatus, CollaborationWithClubs,
    CreateCollaborationRequest, NotificationKind,
};
use crate::services::auth::AuthService;
use crate::services::club::ClubService;
use crate::services::notification::NotificationService;
use crate::utils::errors::{ClubHubError, Result};
use crate::utils::helpers;

/// Outcome chosen by the target club
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaborationResponse {
    Accept,
    Reject,
}

#[derive(Clone)]
pub struct CollaborationService {
    collaborations: CollaborationRepository,
    clubs: ClubRepository,
    club_service: ClubService,
    auth: AuthService,
    notifications: NotificationService,
    settings: Settings,
}

impl CollaborationService {
    pub fn new(
        collaborations: CollaborationRepository,
        clubs: ClubRepository,
        club_service: ClubService,
        auth: AuthService,
        notifications: NotificationService,
        settings: Settings,
    ) -> Self {
        Self { collaborations, clubs, club_service, auth, notifications, settings }
    }

    fn ensure_enabled(&self) -> Result<()> {
        if self.settings.features.collaborations {
            Ok(())
        } else {
            Err(ClubHubError::FeatureDisabled("collaborations"))
        }
    }

    async fn collaboration(&self, id: i64) -> Result<Collaboration> {
        self.collaborations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ClubHubError::not_found("collaboration", id))
    }

    /// Propose a collaboration to another club (admin of the requester)
    pub async fn request(&self, user_id: i64, requester_club_id: i64, request: CreateCollaborationRequest) -> Result<Collaboration> {
        self.ensure_enabled()?;
        let requester = self.club_service.club(requester_club_id).await?;
        self.auth.require_club_admin(user_id, requester_club_id).await?;

        if request.target_club_id == requester_club_id {
            return Err(ClubHubError::InvalidInput("A club cannot collaborate with itself".to_string()));
        }
        if requester.status != ClubStatus::Approved {
            return Err(ClubHubError::InvalidInput("Only approved clubs can request collaborations".to_string()));
        }

        let target = self.club_service.club(request.target_club_id).await?;
        if target.status != ClubStatus::Approved {
            return Err(ClubHubError::not_found("club", target.id));
        }

        let title = helpers::require_text("Title", &request.title, 3, 150)?;
        let message = helpers::optional_text("Message", request.message.as_deref(), 2000)?;

        if self.collaborations.pending_exists(requester.id, target.id).await? {
            return Err(ClubHubError::Conflict("A collaboration request between these clubs is already pending".to_string()));
        }

        let collaboration = self
            .collaborations
            .create(requester.id, target.id, title, message, user_id)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ClubHubError::Conflict("A collaboration request between these clubs is already pending".to_string())
                } else {
                    e
                }
            })?;

        info!(collaboration_id = collaboration.id, requester = requester.id, target = target.id, "Collaboration requested");

        let target_admins = self.clubs.admin_ids(target.id).await.unwrap_or_default();
        self.notifications
            .broadcast(
                &target_admins,
                NotificationKind::CollaborationRequested,
                &[("club_name", requester.name.as_str()), ("title", collaboration.title.as_str())],
                Some(format!("/clubs/{}/collaborations", target.id)),
            )
            .await;

        Ok(collaboration)
    }

    /// Accept or reject an incoming request (admin of the target)
    pub async fn respond(&self, user_id: i64, id: i64, response: CollaborationResponse) -> Result<Collaboration> {
        self.ensure_enabled()?;
        let collaboration = self.collaboration(id).await?;
        self.auth.require_club_admin(user_id, collaboration.target_club_id).await?;

        let (status, kind) = match response {
            CollaborationResponse::Accept => (CollaborationStatus::Accepted, NotificationKind::CollaborationAccepted),
            CollaborationResponse::Reject => (CollaborationStatus::Rejected, NotificationKind::CollaborationRejected),
        };

        let resolved = self.resolve(&collaboration, status, user_id).await?;

        let target = self.club_service.club(resolved.target_club_id).await?;
        let requester_admins = self.clubs.admin_ids(resolved.requester_club_id).await.unwrap_or_default();
        self.notifications
            .broadcast(
                &requester_admins,
                kind,
                &[("club_name", target.name.as_str()), ("title", resolved.title.as_str())],
                Some(format!("/clubs/{}/collaborations", resolved.requester_club_id)),
            )
            .await;

        Ok(resolved)
    }

    /// Withdraw an outgoing request (admin of the requester)
    pub async fn cancel(&self, user_id: i64, id: i64) -> Result<Collaboration> {
        self.ensure_enabled()?;
        let collaboration = self.collaboration(id).await?;
        self.auth.require_club_admin(user_id, collaboration.requester_club_id).await?;
        self.resolve(&collaboration, CollaborationStatus::Cancelled, user_id).await
    }

    async fn resolve(&self, collaboration: &Collaboration, status: CollaborationStatus, user_id: i64) -> Result<Collaboration> {
        let transition = || ClubHubError::InvalidStateTransition {
            from: collaboration.status.as_str().to_string(),
            to: status.as_str().to_string(),
        };

        if collaboration.status != CollaborationStatus::Pending {
            return Err(transition());
        }

        let resolved = self
            .collaborations
            .resolve(collaboration.id, status, user_id)
            .await?
            .ok_or_else(transition)?;

        info!(collaboration_id = resolved.id, status = status.as_str(), by = user_id, "Collaboration resolved");
        Ok(resolved)
    }

    /// Incoming and outgoing requests of a club (club admin)
    pub async fn list_for_club(&self, user_id: i64, club_id: i64, filter: &CollaborationFilter) -> Result<Vec<CollaborationWithClubs>> {
        self.ensure_enabled()?;
        self.club_service.club(club_id).await?;
        self.auth.require_club_admin(user_id, club_id).await?;
        self.collaborations.list_for_club(club_id, filter.status).await
    }
}
