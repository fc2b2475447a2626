//! Event service implementation
//!
//! This service handles event scheduling by club admins, the public event
//! listing, calendar links, and member registration.

use chrono::{DateTime, Utc};
use tracing::debug;
use crate::config::settings::Settings;
use crate::database::repositories::{ClubRepository, EventRepository, RegistrationOutcome};
use crate::models::{
    CalendarLink, ClubStatus, CreateEventRequest, Event, EventFilter, EventParticipant,
    EventSummary, NotificationKind, ParticipantStatus, RegisteredEvent, UpdateEventRequest,
};
use crate::services::auth::{AuthService, Permission};
use crate::services::club::ClubService;
use crate::services::notification::NotificationService;
use crate::services::redis::{RedisService, CLUB_DIRECTORY_PREFIX};
use crate::utils::errors::{ClubHubError, Result};
use crate::utils::helpers::{self, Page, PageRequest};
use crate::utils::logging::log_event_action;

const CALENDAR_BASE_URL: &str = "https://calendar.google.com/calendar/render?action=TEMPLATE";
const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Event service for scheduling and registration
#[derive(Clone)]
pub struct EventService {
    events: EventRepository,
    clubs: ClubRepository,
    club_service: ClubService,
    auth: AuthService,
    notifications: NotificationService,
    redis: RedisService,
    settings: Settings,
}

impl EventService {
    pub fn new(
        events: EventRepository,
        clubs: ClubRepository,
        club_service: ClubService,
        auth: AuthService,
        notifications: NotificationService,
        redis: RedisService,
        settings: Settings,
    ) -> Self {
        Self { events, clubs, club_service, auth, notifications, redis, settings }
    }

    /// Load an event or fail with `NotFound`
    pub async fn event(&self, id: i64) -> Result<Event> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or_else(|| ClubHubError::not_found("event", id))
    }

    /// Upcoming public events of approved clubs
    pub async fn browse(&self, filter: &EventFilter, viewer: Option<i64>) -> Result<Page<EventSummary>> {
        let pagination = PageRequest { page: filter.page, page_size: filter.page_size }
            .resolve(&self.settings.limits);

        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if to < from {
                return Err(ClubHubError::InvalidInput("'to' must not be before 'from'".to_string()));
            }
        }

        let pattern = filter
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(helpers::like_pattern);

        let (items, total) = futures::try_join!(
            self.events.browse(
                filter.club_id,
                filter.university_id,
                filter.from,
                filter.to,
                pattern.as_deref(),
                viewer,
                pagination.limit(),
                pagination.offset()
            ),
            self.events.count_browse(filter.club_id, filter.university_id, filter.from, filter.to, pattern.as_deref())
        )?;

        Ok(Page::new(items, pagination, total))
    }

    /// One event; private events and events of unapproved clubs only for members
    pub async fn get(&self, id: i64, viewer: Option<i64>) -> Result<EventSummary> {
        let summary = self
            .events
            .find_summary(id, viewer)
            .await?
            .ok_or_else(|| ClubHubError::not_found("event", id))?;

        let club = self.club_service.club(summary.event.club_id).await?;
        if summary.event.is_public && club.status == ClubStatus::Approved {
            return Ok(summary);
        }

        match viewer {
            Some(user_id) => {
                let context = self.auth.get_auth_context(user_id, Some(club.id)).await?;
                if context.has(Permission::ClubMember) {
                    Ok(summary)
                } else {
                    Err(ClubHubError::not_found("event", id))
                }
            }
            None => Err(ClubHubError::not_found("event", id)),
        }
    }

    /// Events of a club; outsiders see only public events of approved clubs
    pub async fn club_events(&self, club_id: i64, include_past: bool, viewer: Option<i64>) -> Result<Vec<EventSummary>> {
        let club = self.club_service.get(club_id, viewer).await?;
        let insider = match viewer {
            Some(user_id) => self
                .auth
                .get_auth_context(user_id, Some(club_id))
                .await?
                .has(Permission::ClubMember),
            None => false,
        };

        let events = self.events.club_events(club.club.id, include_past, viewer).await?;
        Ok(events
            .into_iter()
            .filter(|e| insider || e.event.is_public)
            .collect())
    }

    /// Schedule an event (club admin); members are notified
    pub async fn create(&self, user_id: i64, club_id: i64, request: CreateEventRequest) -> Result<Event> {
        let club = self.club_service.club(club_id).await?;
        self.auth.require_club_admin(user_id, club_id).await?;
        let request = validate_new_event(request, Utc::now())?;

        let event = self.events.create(club_id, request, user_id).await?;
        log_event_action(event.id, "created", user_id, Some(&event.title));
        self.redis.invalidate_prefix(CLUB_DIRECTORY_PREFIX).await;

        let members: Vec<i64> = self
            .clubs
            .member_ids(club_id)
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|id| *id != user_id)
            .collect();
        let date = event.starts_at.format(DISPLAY_DATE_FORMAT).to_string();
        self.notifications
            .broadcast(
                &members,
                NotificationKind::EventCreated,
                &[("club_name", club.name.as_str()), ("event_title", event.title.as_str()), ("event_date", date.as_str())],
                Some(format!("/events/{}", event.id)),
            )
            .await;

        Ok(event)
    }

    /// Edit an event (club admin)
    pub async fn update(&self, user_id: i64, event_id: i64, request: UpdateEventRequest) -> Result<Event> {
        let event = self.event(event_id).await?;
        self.auth.require_club_admin(user_id, event.club_id).await?;

        if event.is_cancelled {
            return Err(ClubHubError::Conflict("Cancelled events cannot be edited".to_string()));
        }

        let registered = self.events.registered_count(event_id).await?;
        let request = validate_event_patch(&event, request, registered, Utc::now())?;

        let updated = self.events.update(event_id, request).await?;
        log_event_action(event_id, "updated", user_id, None);
        Ok(updated)
    }

    /// Cancel an event (club admin); registrants are notified
    pub async fn cancel(&self, user_id: i64, event_id: i64) -> Result<Event> {
        let event = self.event(event_id).await?;
        self.auth.require_club_admin(user_id, event.club_id).await?;

        let cancelled = self.events.cancel(event_id).await?.ok_or_else(|| {
            ClubHubError::InvalidStateTransition {
                from: "cancelled".to_string(),
                to: "cancelled".to_string(),
            }
        })?;

        log_event_action(event_id, "cancelled", user_id, None);
        self.redis.invalidate_prefix(CLUB_DIRECTORY_PREFIX).await;

        let registrants = self.events.participant_ids(event_id).await.unwrap_or_default();
        let date = cancelled.starts_at.format(DISPLAY_DATE_FORMAT).to_string();
        self.notifications
            .broadcast(
                &registrants,
                NotificationKind::EventCancelled,
                &[("event_title", cancelled.title.as_str()), ("event_date", date.as_str())],
                Some(format!("/events/{}", event_id)),
            )
            .await;

        Ok(cancelled)
    }

    /// Delete an event and its registrations (club admin)
    pub async fn delete(&self, user_id: i64, event_id: i64) -> Result<()> {
        let event = self.event(event_id).await?;
        self.auth.require_club_admin(user_id, event.club_id).await?;

        if !self.events.delete(event_id).await? {
            return Err(ClubHubError::not_found("event", event_id));
        }

        log_event_action(event_id, "deleted", user_id, Some(&event.title));
        self.redis.invalidate_prefix(CLUB_DIRECTORY_PREFIX).await;
        Ok(())
    }

    /// "Add to Google Calendar" link
    pub async fn calendar_link(&self, event_id: i64, viewer: Option<i64>) -> Result<CalendarLink> {
        let summary = self.get(event_id, viewer).await?;
        Ok(CalendarLink {
            event_id,
            url: calendar_url(&summary.event),
        })
    }

    /// Register the caller for an event
    pub async fn register(&self, user_id: i64, event_id: i64) -> Result<EventParticipant> {
        self.auth.active_user(user_id).await?;
        let summary = self.get(event_id, Some(user_id)).await?;
        let event = summary.event;

        check_registration_open(&event, Utc::now())?;

        let participant = match self.events.register(event_id, user_id, event.capacity).await {
            Ok(RegistrationOutcome::Registered(participant)) => participant,
            Ok(RegistrationOutcome::AlreadyRegistered) => return Err(ClubHubError::AlreadyRegistered),
            Ok(RegistrationOutcome::Full) => return Err(ClubHubError::EventFull),
            Err(e) if e.is_unique_violation() => return Err(ClubHubError::AlreadyRegistered),
            Err(e) => return Err(e),
        };

        log_event_action(event_id, "registered", user_id, None);
        Ok(participant)
    }

    /// Withdraw the caller's registration
    pub async fn unregister(&self, user_id: i64, event_id: i64) -> Result<EventParticipant> {
        let event = self.event(event_id).await?;

        if let Some(participant) = self.events.cancel_registration(event_id, user_id).await? {
            log_event_action(event_id, "unregistered", user_id, None);
            return Ok(participant);
        }

        match self.events.find_participant(event_id, user_id).await? {
            Some(p) if p.status == ParticipantStatus::Attended => Err(ClubHubError::Conflict(
                format!("Already checked in to '{}'", event.title),
            )),
            _ => Err(ClubHubError::NotRegistered),
        }
    }

    /// Events the caller is registered for
    pub async fn my_registrations(&self, user_id: i64, upcoming_only: bool) -> Result<Vec<RegisteredEvent>> {
        let events = self.events.user_registrations(user_id, upcoming_only).await?;
        debug!(user_id = user_id, count = events.len(), "Registrations loaded");
        Ok(events)
    }
}

/// Reject registrations for cancelled, started or closed events
pub fn check_registration_open(event: &Event, now: DateTime<Utc>) -> Result<()> {
    if event.is_cancelled || event.starts_at <= now {
        return Err(ClubHubError::RegistrationClosed);
    }
    if event.registration_deadline.is_some_and(|deadline| deadline < now) {
        return Err(ClubHubError::RegistrationClosed);
    }
    Ok(())
}

/// Google Calendar template link for an event
pub fn calendar_url(event: &Event) -> String {
    let start = event.starts_at.format("%Y%m%dT%H%M%SZ");
    let end = event.ends_at.format("%Y%m%dT%H%M%SZ");

    let mut url = format!(
        "{}&text={}&dates={}/{}",
        CALENDAR_BASE_URL,
        urlencoding::encode(&event.title),
        start,
        end
    );
    if let Some(description) = &event.description {
        url.push_str(&format!("&details={}", urlencoding::encode(description)));
    }
    if let Some(location) = &event.location {
        url.push_str(&format!("&location={}", urlencoding::encode(location)));
    }
    url
}

fn check_schedule(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>, deadline: Option<DateTime<Utc>>, capacity: Option<i32>) -> Result<()> {
    if ends_at <= starts_at {
        return Err(ClubHubError::InvalidInput("Event must end after it starts".to_string()));
    }
    if deadline.is_some_and(|d| d > starts_at) {
        return Err(ClubHubError::InvalidInput("Registration deadline must not be after the start".to_string()));
    }
    if capacity.is_some_and(|c| c <= 0) {
        return Err(ClubHubError::InvalidInput("Capacity must be positive".to_string()));
    }
    Ok(())
}

/// Validate a new event against the current time
pub fn validate_new_event(request: CreateEventRequest, now: DateTime<Utc>) -> Result<CreateEventRequest> {
    if request.starts_at <= now {
        return Err(ClubHubError::InvalidInput("Event must start in the future".to_string()));
    }
    check_schedule(request.starts_at, request.ends_at, request.registration_deadline, request.capacity)?;

    Ok(CreateEventRequest {
        title: helpers::require_text("Title", &request.title, 3, 150)?,
        description: helpers::optional_text("Description", request.description.as_deref(), 5000)?,
        location: helpers::optional_text("Location", request.location.as_deref(), 200)?,
        image_url: helpers::optional_url("Image URL", request.image_url.as_deref())?,
        ..request
    })
}

/// Validate a patch against the stored event and its current registrations
pub fn validate_event_patch(current: &Event, request: UpdateEventRequest, registered: i64, now: DateTime<Utc>) -> Result<UpdateEventRequest> {
    if request.starts_at.is_some_and(|s| s != current.starts_at && s <= now) {
        return Err(ClubHubError::InvalidInput("Event must start in the future".to_string()));
    }

    let starts_at = request.starts_at.unwrap_or(current.starts_at);
    let ends_at = request.ends_at.unwrap_or(current.ends_at);
    let deadline = request.registration_deadline.or(current.registration_deadline);
    check_schedule(starts_at, ends_at, deadline, request.capacity)?;

    if let Some(capacity) = request.capacity {
        if (capacity as i64) < registered {
            return Err(ClubHubError::InvalidInput(format!(
                "Capacity cannot drop below the {} current registrations",
                registered
            )));
        }
    }

    let title = match request.title.as_deref() {
        Some(title) => Some(helpers::require_text("Title", title, 3, 150)?),
        None => None,
    };

    Ok(UpdateEventRequest {
        title,
        description: helpers::optional_text("Description", request.description.as_deref(), 5000)?,
        location: helpers::optional_text("Location", request.location.as_deref(), 200)?,
        image_url: helpers::optional_url("Image URL", request.image_url.as_deref())?,
        ..request
    })
}
