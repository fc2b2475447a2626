//! Club service implementation
//!
//! This service handles the club directory, club creation and editing,
//! and the system-admin review flow.

use tracing::{debug, warn};
use crate::config::settings::Settings;
use crate::database::repositories::{ClubRepository, UserRepository};
use crate::models::{
    Club, ClubFilter, ClubStatus, ClubSummary, CreateClubRequest, NotificationKind, ReviewDecision,
    UpdateClubRequest, CLUB_CATEGORIES,
};
use crate::services::auth::AuthService;
use crate::services::notification::NotificationService;
use crate::services::redis::{club_directory_key, RedisService, CLUB_DIRECTORY_PREFIX};
use crate::utils::errors::{ClubHubError, Result};
use crate::utils::helpers::{self, Page, PageRequest};
use crate::utils::logging::{log_admin_action, log_club_event};

pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_LENGTH: usize = 30;

/// Club service for directory and lifecycle operations
#[derive(Clone)]
pub struct ClubService {
    clubs: ClubRepository,
    users: UserRepository,
    auth: AuthService,
    notifications: NotificationService,
    redis: RedisService,
    settings: Settings,
}

impl ClubService {
    pub fn new(
        clubs: ClubRepository,
        users: UserRepository,
        auth: AuthService,
        notifications: NotificationService,
        redis: RedisService,
        settings: Settings,
    ) -> Self {
        Self { clubs, users, auth, notifications, redis, settings }
    }

    /// Approved clubs matching the filter, cached per filter and page
    pub async fn browse(&self, filter: &ClubFilter) -> Result<Page<ClubSummary>> {
        let pagination = PageRequest { page: filter.page, page_size: filter.page_size }
            .resolve(&self.settings.limits);
        let category = match filter.category.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(category) => Some(canonical_category(category)?),
            None => None,
        };
        let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let pattern = search.map(helpers::like_pattern);
        let university_id = filter.university_id;

        let key = club_directory_key(university_id, category, search, pagination.page, pagination.page_size);
        let clubs = self.clubs.clone();

        self.redis
            .cached(&key, None, move || async move {
                let (items, total) = futures::try_join!(
                    clubs.browse(university_id, category, pattern.as_deref(), pagination.limit(), pagination.offset()),
                    clubs.count_browse(university_id, category, pattern.as_deref())
                )?;
                Ok::<_, ClubHubError>(Page::new(items, pagination, total))
            })
            .await
    }

    /// Load a club or fail with `NotFound`
    pub async fn club(&self, id: i64) -> Result<Club> {
        self.clubs
            .find_by_id(id)
            .await?
            .ok_or_else(|| ClubHubError::not_found("club", id))
    }

    /// A club as seen by the viewer; unapproved clubs only for their admins and system admins
    pub async fn get(&self, id: i64, viewer: Option<i64>) -> Result<ClubSummary> {
        let summary = self
            .clubs
            .find_summary(id)
            .await?
            .ok_or_else(|| ClubHubError::not_found("club", id))?;

        if summary.club.status == ClubStatus::Approved {
            return Ok(summary);
        }

        match viewer {
            Some(user_id) => {
                let context = self.auth.get_auth_context(user_id, Some(id)).await?;
                if context.is_club_admin || context.is_system_admin {
                    Ok(summary)
                } else {
                    Err(ClubHubError::not_found("club", id))
                }
            }
            None => Err(ClubHubError::not_found("club", id)),
        }
    }

    /// Create a club; the creator becomes its first admin and president
    pub async fn create(&self, user_id: i64, request: CreateClubRequest) -> Result<Club> {
        self.auth.active_user(user_id).await?;
        let request = validate_new_club(request)?;

        let status = if self.settings.features.club_approval_required {
            ClubStatus::Pending
        } else {
            ClubStatus::Approved
        };

        let club = self
            .clubs
            .create_with_founder(request, status, user_id)
            .await
            .map_err(duplicate_name)?;

        if club.status == ClubStatus::Approved {
            self.redis.invalidate_prefix(CLUB_DIRECTORY_PREFIX).await;
        }

        log_club_event(club.id, "created", Some(user_id), Some(club.status.as_str()));
        Ok(club)
    }

    /// Edit a club's details (club admin)
    pub async fn update(&self, user_id: i64, club_id: i64, request: UpdateClubRequest) -> Result<Club> {
        self.club(club_id).await?;
        self.auth.require_club_admin(user_id, club_id).await?;
        let request = validate_club_patch(request)?;

        let club = self.clubs.update(club_id, request).await.map_err(duplicate_name)?;
        self.redis.invalidate_prefix(CLUB_DIRECTORY_PREFIX).await;

        log_club_event(club_id, "updated", Some(user_id), None);
        Ok(club)
    }

    /// Delete a club and everything hanging off it
    pub async fn delete(&self, user_id: i64, club_id: i64) -> Result<()> {
        self.club(club_id).await?;
        self.auth.require_club_admin(user_id, club_id).await?;

        let admins = self.clubs.admin_ids(club_id).await?;
        if !self.clubs.delete(club_id).await? {
            return Err(ClubHubError::not_found("club", club_id));
        }

        for admin_id in admins {
            self.users.demote_if_no_clubs(admin_id).await?;
        }

        self.redis.invalidate_prefix(CLUB_DIRECTORY_PREFIX).await;
        log_club_event(club_id, "deleted", Some(user_id), None);
        Ok(())
    }

    /// Approve or reject a pending club (system admin)
    pub async fn review(&self, admin_id: i64, club_id: i64, decision: ReviewDecision) -> Result<Club> {
        self.auth.require_system_admin(admin_id).await?;
        let club = self.club(club_id).await?;

        let (target, reason) = match decision {
            ReviewDecision::Approve => (ClubStatus::Approved, None),
            ReviewDecision::Reject { reason } => (
                ClubStatus::Rejected,
                Some(helpers::require_text("Rejection reason", &reason, 1, 500)?),
            ),
        };

        if club.status != ClubStatus::Pending {
            return Err(ClubHubError::InvalidStateTransition {
                from: club.status.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }

        let reviewed = self
            .clubs
            .review(club_id, target, admin_id, reason.clone())
            .await?
            .ok_or_else(|| ClubHubError::InvalidStateTransition {
                from: "reviewed".to_string(),
                to: target.as_str().to_string(),
            })?;

        log_admin_action(admin_id, "review_club", Some(&club_id.to_string()), Some(target.as_str()));
        self.redis.invalidate_prefix(CLUB_DIRECTORY_PREFIX).await;

        if let Some(creator) = reviewed.created_by {
            let (kind, reason) = match target {
                ClubStatus::Approved => (NotificationKind::ClubApproved, String::new()),
                _ => (NotificationKind::ClubRejected, reason.unwrap_or_default()),
            };
            let notified = self
                .notifications
                .notify(
                    creator,
                    kind,
                    &[("club_name", reviewed.name.as_str()), ("reason", reason.as_str())],
                    Some(format!("/clubs/{}", reviewed.id)),
                )
                .await;
            if let Err(e) = notified {
                warn!(club_id = club_id, user_id = creator, error = %e, "Failed to notify club creator");
            }
        }

        Ok(reviewed)
    }

    /// Clubs awaiting review, oldest first (system admin)
    pub async fn list_pending(&self, admin_id: i64) -> Result<Vec<ClubSummary>> {
        self.auth.require_system_admin(admin_id).await?;
        self.clubs.list_by_status(ClubStatus::Pending).await
    }

    pub async fn my_clubs(&self, user_id: i64) -> Result<Vec<ClubSummary>> {
        self.clubs.user_clubs(user_id).await
    }

    pub async fn admin_clubs(&self, user_id: i64) -> Result<Vec<ClubSummary>> {
        let clubs = self.clubs.admin_clubs(user_id).await?;
        debug!(user_id = user_id, count = clubs.len(), "Administered clubs loaded");
        Ok(clubs)
    }
}

fn duplicate_name(e: ClubHubError) -> ClubHubError {
    if e.is_unique_violation() {
        ClubHubError::Conflict("A club with this name already exists at this university".to_string())
    } else {
        e
    }
}

/// Match a category case-insensitively against the fixed list
pub fn canonical_category(category: &str) -> Result<&'static str> {
    CLUB_CATEGORIES
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(category.trim()))
        .ok_or_else(|| ClubHubError::InvalidInput(format!(
            "Unknown category '{}'; expected one of: {}",
            category.trim(),
            CLUB_CATEGORIES.join(", ")
        )))
}

/// Trim, de-duplicate and bound a tag list
pub fn validate_tags(tags: Vec<String>) -> Result<Vec<String>> {
    let mut cleaned: Vec<String> = Vec::new();
    for tag in tags {
        let tag = helpers::normalize_whitespace(&tag);
        if tag.is_empty() {
            continue;
        }
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(ClubHubError::InvalidInput(format!(
                "Tags must be at most {} characters",
                MAX_TAG_LENGTH
            )));
        }
        if !cleaned.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            cleaned.push(tag);
        }
    }

    if cleaned.len() > MAX_TAGS {
        return Err(ClubHubError::InvalidInput(format!("At most {} tags are allowed", MAX_TAGS)));
    }
    Ok(cleaned)
}

fn validate_social_links(links: Option<serde_json::Value>) -> Result<Option<serde_json::Value>> {
    match links {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Object(map)) => {
            for (network, url) in &map {
                let valid = url.as_str().is_some_and(helpers::is_valid_url);
                if !valid {
                    return Err(ClubHubError::InvalidInput(format!("Social link '{}' must be a URL", network)));
                }
            }
            Ok(Some(serde_json::Value::Object(map)))
        }
        Some(_) => Err(ClubHubError::InvalidInput("Social links must be an object".to_string())),
    }
}

fn validate_contact_email(email: Option<&str>) -> Result<Option<String>> {
    match email.map(str::trim).filter(|e| !e.is_empty()) {
        None => Ok(None),
        Some(e) if helpers::is_valid_email(e) => Ok(Some(e.to_lowercase())),
        Some(_) => Err(ClubHubError::InvalidInput("Invalid contact email".to_string())),
    }
}

/// Validate a new club request
pub fn validate_new_club(request: CreateClubRequest) -> Result<CreateClubRequest> {
    Ok(CreateClubRequest {
        name: helpers::normalize_whitespace(&helpers::require_text("Club name", &request.name, 3, 100)?),
        description: helpers::require_text("Description", &request.description, 10, 2000)?,
        category: canonical_category(&request.category)?.to_string(),
        university_id: request.university_id,
        logo_url: helpers::optional_url("Logo URL", request.logo_url.as_deref())?,
        contact_email: validate_contact_email(request.contact_email.as_deref())?,
        meeting_schedule: helpers::optional_text("Meeting schedule", request.meeting_schedule.as_deref(), 200)?,
        social_links: validate_social_links(request.social_links)?,
        tags: Some(validate_tags(request.tags.unwrap_or_default())?),
    })
}

/// Validate a club patch; absent fields stay absent
pub fn validate_club_patch(request: UpdateClubRequest) -> Result<UpdateClubRequest> {
    let name = match request.name.as_deref() {
        Some(name) => Some(helpers::normalize_whitespace(&helpers::require_text("Club name", name, 3, 100)?)),
        None => None,
    };
    let description = match request.description.as_deref() {
        Some(d) => Some(helpers::require_text("Description", d, 10, 2000)?),
        None => None,
    };
    let category = match request.category.as_deref() {
        Some(c) => Some(canonical_category(c)?.to_string()),
        None => None,
    };
    let tags = match request.tags {
        Some(tags) => Some(validate_tags(tags)?),
        None => None,
    };

    Ok(UpdateClubRequest {
        name,
        description,
        category,
        logo_url: helpers::optional_url("Logo URL", request.logo_url.as_deref())?,
        contact_email: validate_contact_email(request.contact_email.as_deref())?,
        meeting_schedule: helpers::optional_text("Meeting schedule", request.meeting_schedule.as_deref(), 200)?,
        social_links: validate_social_links(request.social_links)?,
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn valid_request() -> CreateClubRequest {
        CreateClubRequest {
            name: "  Chess   Club ".to_string(),
            description: "Weekly games and tournaments".to_string(),
            category: "academic".to_string(),
            contact_email: Some("Chess@Uni.edu".to_string()),
            tags: Some(vec!["strategy".to_string(), "Strategy".to_string(), " ".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_club_is_normalized() {
        let club = validate_new_club(valid_request()).unwrap();
        assert_eq!(club.name, "Chess Club");
        assert_eq!(club.category, "Academic");
        assert_eq!(club.contact_email.as_deref(), Some("chess@uni.edu"));
        assert_eq!(club.tags, Some(vec!["strategy".to_string()]));
    }

    #[test]
    fn test_new_club_field_rules() {
        let short_name = CreateClubRequest { name: "ab".to_string(), ..valid_request() };
        assert_matches!(validate_new_club(short_name), Err(ClubHubError::InvalidInput(_)));

        let short_description = CreateClubRequest { description: "too short".to_string(), ..valid_request() };
        assert_matches!(validate_new_club(short_description), Err(ClubHubError::InvalidInput(_)));

        let bad_category = CreateClubRequest { category: "Knitting".to_string(), ..valid_request() };
        assert_matches!(validate_new_club(bad_category), Err(ClubHubError::InvalidInput(_)));

        let bad_email = CreateClubRequest { contact_email: Some("nobody".to_string()), ..valid_request() };
        assert_matches!(validate_new_club(bad_email), Err(ClubHubError::InvalidInput(_)));
    }

    #[test]
    fn test_tag_limits() {
        let too_many: Vec<String> = (0..11).map(|i| format!("tag{}", i)).collect();
        assert!(validate_tags(too_many).is_err());
        assert!(validate_tags(vec!["x".repeat(31)]).is_err());
        assert_eq!(validate_tags(vec!["  board   games ".to_string()]).unwrap(), vec!["board games"]);
    }

    #[test]
    fn test_social_links_must_be_url_map() {
        assert!(validate_social_links(Some(json!({"instagram": "https://instagram.com/chess"}))).is_ok());
        assert!(validate_social_links(Some(json!({"instagram": "@chess"}))).is_err());
        assert!(validate_social_links(Some(json!(["https://x.com"]))).is_err());
        assert_eq!(validate_social_links(Some(serde_json::Value::Null)).unwrap(), None);
    }

    #[test]
    fn test_patch_keeps_absent_fields_absent() {
        let patch = validate_club_patch(UpdateClubRequest {
            category: Some("SPORTS".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.category.as_deref(), Some("Sports"));
        assert!(patch.name.is_none());
        assert!(patch.tags.is_none());
    }
}
