//! Attendance service: attendee lists, check-in and CSV export for club admins

use tracing::info;
use crate::config::settings::Settings;
use crate::database::repositories::{EventRepository, StatusCounts};
use crate::models::{AttendanceSummary, Attendee, AttendeeFilter, AttendeeList, Event, EventParticipant, ParticipantStatus};
use crate::services::auth::AuthService;
use crate::utils::errors::{ClubHubError, Result};
use crate::utils::helpers::{self, Page, PageRequest};
use crate::utils::logging::log_event_action;

pub const CSV_HEADER: [&str; 6] = ["Name", "Email", "Student ID", "Status", "Registered At", "Checked In At"];

#[derive(Clone)]
pub struct AttendanceService {
    events: EventRepository,
    auth: AuthService,
    settings: Settings,
}

impl AttendanceService {
    pub fn new(events: EventRepository, auth: AuthService, settings: Settings) -> Self {
        Self { events, auth, settings }
    }

    async fn managed_event(&self, user_id: i64, event_id: i64) -> Result<Event> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| ClubHubError::not_found("event", event_id))?;
        self.auth.require_club_admin(user_id, event.club_id).await?;
        Ok(event)
    }

    /// Paginated attendees with totals
    pub async fn attendees(&self, user_id: i64, event_id: i64, filter: &AttendeeFilter) -> Result<AttendeeList> {
        self.managed_event(user_id, event_id).await?;

        let pagination = PageRequest { page: filter.page, page_size: filter.page_size }
            .resolve(&self.settings.limits);
        let pattern = filter
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(helpers::like_pattern);

        let (items, total, counts) = futures::try_join!(
            self.events.attendees(event_id, filter.status, pattern.as_deref(), pagination.limit(), pagination.offset()),
            self.events.count_attendees(event_id, filter.status, pattern.as_deref()),
            self.events.status_counts(event_id)
        )?;

        Ok(AttendeeList {
            page: Page::new(items, pagination, total),
            checked_in_count: counts.attended,
        })
    }

    /// Mark a registered participant as attended
    pub async fn check_in(&self, admin_id: i64, event_id: i64, user_id: i64) -> Result<EventParticipant> {
        self.managed_event(admin_id, event_id).await?;

        if let Some(participant) = self.events.check_in(event_id, user_id, admin_id).await? {
            log_event_action(event_id, "check_in", admin_id, Some(&user_id.to_string()));
            return Ok(participant);
        }

        match self.events.find_participant(event_id, user_id).await? {
            Some(p) if p.status == ParticipantStatus::Attended => {
                Err(ClubHubError::Conflict("Participant is already checked in".to_string()))
            }
            _ => Err(ClubHubError::NotRegistered),
        }
    }

    /// Revert a check-in
    pub async fn undo_check_in(&self, admin_id: i64, event_id: i64, user_id: i64) -> Result<EventParticipant> {
        self.managed_event(admin_id, event_id).await?;

        let participant = self
            .events
            .undo_check_in(event_id, user_id)
            .await?
            .ok_or_else(|| ClubHubError::InvalidInput("Participant is not checked in".to_string()))?;

        log_event_action(event_id, "undo_check_in", admin_id, Some(&user_id.to_string()));
        Ok(participant)
    }

    /// All non-cancelled attendees as CSV; returns the file name and body
    pub async fn export_csv(&self, user_id: i64, event_id: i64) -> Result<(String, String)> {
        let event = self.managed_event(user_id, event_id).await?;
        let attendees = self.events.all_attendees(event_id).await?;

        info!(event_id = event_id, rows = attendees.len(), "Attendee export generated");
        Ok((export_file_name(&event), attendees_csv(&attendees)?))
    }

    pub async fn summary(&self, user_id: i64, event_id: i64) -> Result<AttendanceSummary> {
        let event = self.managed_event(user_id, event_id).await?;
        let counts = self.events.status_counts(event_id).await?;
        Ok(summarize(&event, counts))
    }
}

/// Attendance rate is attended over everyone still signed up
pub fn summarize(event: &Event, counts: StatusCounts) -> AttendanceSummary {
    let signed_up = counts.registered + counts.attended;
    let attendance_rate = if signed_up > 0 {
        counts.attended as f64 / signed_up as f64
    } else {
        0.0
    };

    AttendanceSummary {
        event_id: event.id,
        registered: counts.registered,
        attended: counts.attended,
        cancelled: counts.cancelled,
        capacity: event.capacity,
        attendance_rate,
    }
}

pub fn attendees_csv(attendees: &[Attendee]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for a in attendees {
        writer.write_record([
            a.full_name.clone(),
            a.email.clone(),
            a.student_id.clone().unwrap_or_default(),
            a.status.as_str().to_string(),
            helpers::format_timestamp(a.registered_at),
            a.checked_in_at.map(helpers::format_timestamp).unwrap_or_default(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ClubHubError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

fn export_file_name(event: &Event) -> String {
    let slug: String = event
        .title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    format!("attendees-{}-{}.csv", event.id, slug)
}
