//! Notification service implementation
//!
//! This service renders in-app notifications from message templates with
//! `{param}` substitution, stores them for single users or whole audiences,
//! and serves the per-user inbox.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::config::settings::Settings;
use crate::database::repositories::NotificationRepository;
use crate::models::{CreateNotificationRequest, Notification, NotificationFilter, NotificationKind, UnreadCount};
use crate::utils::errors::{ClubHubError, Result};
use crate::utils::helpers::{Page, PageRequest};

/// Message template structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

/// Notification service for the in-app inbox
#[derive(Clone)]
pub struct NotificationService {
    repository: NotificationRepository,
    settings: Settings,
    templates: HashMap<NotificationKind, MessageTemplate>,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(repository: NotificationRepository, settings: Settings) -> Self {
        Self {
            repository,
            settings,
            templates: Self::load_default_templates(),
        }
    }

    /// Render a template into a notification for one recipient
    pub fn render(&self, user_id: i64, kind: NotificationKind, parameters: &[(&str, &str)], link: Option<String>) -> Result<CreateNotificationRequest> {
        let template = self.templates.get(&kind)
            .ok_or_else(|| ClubHubError::InvalidInput(format!("Template not found: {:?}", kind)))?;

        Ok(CreateNotificationRequest {
            user_id,
            kind,
            title: substitute(&template.title, parameters),
            message: substitute(&template.body, parameters),
            link,
        })
    }

    /// Notify a single user
    pub async fn notify(&self, user_id: i64, kind: NotificationKind, parameters: &[(&str, &str)], link: Option<String>) -> Result<Notification> {
        let request = self.render(user_id, kind, parameters, link)?;
        let notification = self.repository.create(request).await?;
        debug!(user_id = user_id, kind = ?kind, "Notification stored");
        Ok(notification)
    }

    /// Notify many users with the same rendered message
    pub async fn notify_many(&self, user_ids: &[i64], kind: NotificationKind, parameters: &[(&str, &str)], link: Option<String>) -> Result<u64> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let template = self.render(0, kind, parameters, link)?;
        let created = self.repository.create_many(user_ids, &template).await?;
        info!(kind = ?kind, recipients = created, "Bulk notification stored");
        Ok(created)
    }

    /// Notify many users; failures are logged and never reach the caller
    pub async fn broadcast(&self, user_ids: &[i64], kind: NotificationKind, parameters: &[(&str, &str)], link: Option<String>) {
        if let Err(e) = self.notify_many(user_ids, kind, parameters, link).await {
            warn!(kind = ?kind, recipients = user_ids.len(), error = %e, "Failed to deliver notifications");
        }
    }

    /// Paginated inbox for a user
    pub async fn list(&self, user_id: i64, filter: &NotificationFilter) -> Result<Page<Notification>> {
        let pagination = PageRequest { page: filter.page, page_size: filter.page_size }
            .resolve(&self.settings.limits);

        let (items, total) = futures::try_join!(
            self.repository.list(user_id, filter.unread_only, pagination.limit(), pagination.offset()),
            self.repository.count(user_id, filter.unread_only)
        )?;

        Ok(Page::new(items, pagination, total))
    }

    pub async fn unread_count(&self, user_id: i64) -> Result<UnreadCount> {
        let unread = self.repository.count(user_id, true).await?;
        Ok(UnreadCount { unread })
    }

    /// Mark one notification read; only its owner may do so
    pub async fn mark_read(&self, id: i64, user_id: i64) -> Result<Notification> {
        self.repository
            .mark_read(id, user_id)
            .await?
            .ok_or_else(|| ClubHubError::not_found("notification", id))
    }

    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        let updated = self.repository.mark_all_read(user_id).await?;
        debug!(user_id = user_id, updated = updated, "Notifications marked read");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> Result<()> {
        if self.repository.delete(id, user_id).await? {
            Ok(())
        } else {
            Err(ClubHubError::not_found("notification", id))
        }
    }

    /// Available template kinds
    pub fn template_kinds(&self) -> Vec<NotificationKind> {
        self.templates.keys().copied().collect()
    }

    /// Load default message templates
    fn load_default_templates() -> HashMap<NotificationKind, MessageTemplate> {
        let defaults = [
            (NotificationKind::ClubJoined, "Welcome to {club_name}", "You are now a member of {club_name}."),
            (NotificationKind::MemberJoined, "New member in {club_name}", "{member_name} joined {club_name}."),
            (NotificationKind::ClubApproved, "{club_name} was approved", "Your club {club_name} is now listed in the directory."),
            (NotificationKind::ClubRejected, "{club_name} was not approved", "Your club {club_name} was rejected: {reason}"),
            (NotificationKind::EventCreated, "New event: {event_title}", "{club_name} scheduled {event_title} on {event_date}."),
            (NotificationKind::EventCancelled, "Event cancelled: {event_title}", "{event_title} on {event_date} has been cancelled."),
            (NotificationKind::EventReminder, "Reminder: {event_title}", "{event_title} starts on {event_date}."),
            (NotificationKind::Announcement, "{club_name}: {title}", "{content}"),
            (NotificationKind::CollaborationRequested, "Collaboration request from {club_name}", "{club_name} proposed \"{title}\"."),
            (NotificationKind::CollaborationAccepted, "Collaboration accepted", "{club_name} accepted \"{title}\"."),
            (NotificationKind::CollaborationRejected, "Collaboration declined", "{club_name} declined \"{title}\"."),
            (NotificationKind::AdminGranted, "You are now an admin of {club_name}", "You can now manage {club_name}."),
            (NotificationKind::System, "{title}", "{content}"),
        ];

        defaults
            .into_iter()
            .map(|(kind, title, body)| {
                (kind, MessageTemplate { kind, title: title.to_string(), body: body.to_string() })
            })
            .collect()
    }
}

/// Replace `{key}` placeholders; unknown placeholders are left as-is
fn substitute(template: &str, parameters: &[(&str, &str)]) -> String {
    parameters.iter().fold(template.to_string(), |formatted, (key, value)| {
        formatted.replace(&format!("{{{}}}", key), value)
    })
}
