//! Event repository implementation
//!
//! Covers events, registrations and attendance.

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::event::{
    Attendee, CreateEventRequest, Event, EventParticipant, EventSummary, ParticipantStatus,
    RegisteredEvent, UpdateEventRequest,
};
use crate::utils::errors::ClubHubError;

const EVENT_COLUMNS: &str = "id, club_id, title, description, location, starts_at, ends_at, capacity, registration_deadline, is_public, is_cancelled, image_url, created_by, created_at, updated_at";

const PARTICIPANT_COLUMNS: &str = "id, event_id, user_id, status, registered_at, checked_in_at, checked_in_by";

const BROWSE_FILTER: &str = r#"
    WHERE NOT e.is_cancelled AND e.is_public AND c.status = 'approved'
      AND e.starts_at >= GREATEST(NOW(), COALESCE($3::TIMESTAMPTZ, NOW()))
      AND ($4::TIMESTAMPTZ IS NULL OR e.starts_at <= $4)
      AND ($1::BIGINT IS NULL OR e.club_id = $1)
      AND ($2::BIGINT IS NULL OR c.university_id = $2)
      AND ($5::TEXT IS NULL OR e.title ILIKE $5 OR e.description ILIKE $5 OR e.location ILIKE $5)
"#;

const ATTENDEE_FILTER: &str = r#"
    WHERE p.event_id = $1
      AND (($2::participant_status IS NULL AND p.status <> 'cancelled') OR p.status = $2)
      AND ($3::TEXT IS NULL OR pr.full_name ILIKE $3 OR pr.email ILIKE $3 OR pr.student_id ILIKE $3)
"#;

/// Event select with counts; `viewer` names the bind parameter holding the caller's id
fn summary_select(viewer: &str) -> String {
    format!(
        r#"
        SELECT e.id, e.club_id, e.title, e.description, e.location, e.starts_at, e.ends_at, e.capacity,
               e.registration_deadline, e.is_public, e.is_cancelled, e.image_url, e.created_by,
               e.created_at, e.updated_at,
               c.name AS club_name,
               (SELECT COUNT(*) FROM event_participants p
                  WHERE p.event_id = e.id AND p.status <> 'cancelled') AS registered_count,
               EXISTS (SELECT 1 FROM event_participants p
                  WHERE p.event_id = e.id AND p.user_id = {viewer}::BIGINT AND p.status <> 'cancelled') AS is_registered
        FROM events e
        JOIN clubs c ON c.id = e.club_id
        "#
    )
}

/// Result of a registration attempt
#[derive(Debug, Clone)]
pub enum RegistrationOutcome {
    Registered(EventParticipant),
    AlreadyRegistered,
    Full,
}

/// Registration counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct StatusCounts {
    pub registered: i64,
    pub attended: i64,
    pub cancelled: i64,
}

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, club_id: i64, request: CreateEventRequest, created_by: i64) -> Result<Event, ClubHubError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (club_id, title, description, location, starts_at, ends_at, capacity,
                                registration_deadline, is_public, image_url, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(club_id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.location)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .bind(request.capacity)
        .bind(request.registration_deadline)
        .bind(request.is_public.unwrap_or(true))
        .bind(request.image_url)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, ClubHubError> {
        let event = sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Find event with club name and counts as seen by `viewer`
    pub async fn find_summary(&self, id: i64, viewer: Option<i64>) -> Result<Option<EventSummary>, ClubHubError> {
        let event = sqlx::query_as::<_, EventSummary>(&format!("{} WHERE e.id = $1", summary_select("$2")))
            .bind(id)
            .bind(viewer)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Upcoming public events of approved clubs
    #[allow(clippy::too_many_arguments)]
    pub async fn browse(&self, club_id: Option<i64>, university_id: Option<i64>, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>, pattern: Option<&str>, viewer: Option<i64>, limit: i64, offset: i64) -> Result<Vec<EventSummary>, ClubHubError> {
        let events = sqlx::query_as::<_, EventSummary>(&format!(
            "{} {BROWSE_FILTER} ORDER BY e.starts_at ASC LIMIT $7 OFFSET $8",
            summary_select("$6")
        ))
        .bind(club_id)
        .bind(university_id)
        .bind(from)
        .bind(to)
        .bind(pattern)
        .bind(viewer)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Count events matching the same filter as `browse`
    pub async fn count_browse(&self, club_id: Option<i64>, university_id: Option<i64>, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>, pattern: Option<&str>) -> Result<i64, ClubHubError> {
        let count: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM events e JOIN clubs c ON c.id = e.club_id {BROWSE_FILTER}"
        ))
        .bind(club_id)
        .bind(university_id)
        .bind(from)
        .bind(to)
        .bind(pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Events of one club, soonest first; past ones only when asked
    pub async fn club_events(&self, club_id: i64, include_past: bool, viewer: Option<i64>) -> Result<Vec<EventSummary>, ClubHubError> {
        let events = sqlx::query_as::<_, EventSummary>(&format!(
            r#"{}
            WHERE e.club_id = $1 AND ($3 OR e.ends_at >= NOW())
            ORDER BY e.starts_at ASC"#,
            summary_select("$2")
        ))
        .bind(club_id)
        .bind(viewer)
        .bind(include_past)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Update event; absent fields keep their value
    pub async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Event, ClubHubError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                starts_at = COALESCE($5, starts_at),
                ends_at = COALESCE($6, ends_at),
                capacity = COALESCE($7, capacity),
                registration_deadline = COALESCE($8, registration_deadline),
                is_public = COALESCE($9, is_public),
                image_url = COALESCE($10, image_url),
                updated_at = $11
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.location)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .bind(request.capacity)
        .bind(request.registration_deadline)
        .bind(request.is_public)
        .bind(request.image_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Mark event cancelled; `None` if it already was
    pub async fn cancel(&self, id: i64) -> Result<Option<Event>, ClubHubError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET is_cancelled = TRUE, updated_at = $2 WHERE id = $1 AND NOT is_cancelled RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Delete event; registrations cascade
    pub async fn delete(&self, id: i64) -> Result<bool, ClubHubError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Active (non-cancelled) registrations
    pub async fn registered_count(&self, event_id: i64) -> Result<i64, ClubHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_participants WHERE event_id = $1 AND status <> 'cancelled'"
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Find one registration row
    pub async fn find_participant(&self, event_id: i64, user_id: i64) -> Result<Option<EventParticipant>, ClubHubError> {
        let participant = sqlx::query_as::<_, EventParticipant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM event_participants WHERE event_id = $1 AND user_id = $2"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Register a user, re-activating a cancelled registration
    ///
    /// The event row is locked so concurrent registrations cannot overshoot capacity.
    pub async fn register(&self, event_id: i64, user_id: i64, capacity: Option<i32>) -> Result<RegistrationOutcome, ClubHubError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        let existing: Option<(ParticipantStatus,)> = sqlx::query_as(
            "SELECT status FROM event_participants WHERE event_id = $1 AND user_id = $2"
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if matches!(existing, Some((status,)) if status != ParticipantStatus::Cancelled) {
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        if let Some(capacity) = capacity {
            let count: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM event_participants WHERE event_id = $1 AND status <> 'cancelled'"
            )
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;
            if count.0 >= capacity as i64 {
                return Ok(RegistrationOutcome::Full);
            }
        }

        let participant = sqlx::query_as::<_, EventParticipant>(&format!(
            r#"
            INSERT INTO event_participants (event_id, user_id, status, registered_at)
            VALUES ($1, $2, 'registered', $3)
            ON CONFLICT (event_id, user_id) DO UPDATE
            SET status = 'registered', registered_at = EXCLUDED.registered_at,
                checked_in_at = NULL, checked_in_by = NULL
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(RegistrationOutcome::Registered(participant))
    }

    /// Cancel an active, not yet checked-in registration
    pub async fn cancel_registration(&self, event_id: i64, user_id: i64) -> Result<Option<EventParticipant>, ClubHubError> {
        let participant = sqlx::query_as::<_, EventParticipant>(&format!(
            r#"
            UPDATE event_participants SET status = 'cancelled'
            WHERE event_id = $1 AND user_id = $2 AND status = 'registered'
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Events the user holds an active registration for
    pub async fn user_registrations(&self, user_id: i64, upcoming_only: bool) -> Result<Vec<RegisteredEvent>, ClubHubError> {
        let events = sqlx::query_as::<_, RegisteredEvent>(
            r#"
            SELECT e.id, e.club_id, e.title, e.description, e.location, e.starts_at, e.ends_at, e.capacity,
                   e.registration_deadline, e.is_public, e.is_cancelled, e.image_url, e.created_by,
                   e.created_at, e.updated_at,
                   c.name AS club_name,
                   p.status AS participant_status,
                   p.registered_at
            FROM event_participants p
            JOIN events e ON e.id = p.event_id
            JOIN clubs c ON c.id = e.club_id
            WHERE p.user_id = $1 AND p.status <> 'cancelled'
              AND (NOT $2 OR e.ends_at >= NOW())
            ORDER BY e.starts_at ASC
            "#
        )
        .bind(user_id)
        .bind(upcoming_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// IDs of users with an active registration
    pub async fn participant_ids(&self, event_id: i64) -> Result<Vec<i64>, ClubHubError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT user_id FROM event_participants WHERE event_id = $1 AND status <> 'cancelled'"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Attendees with profile data; cancelled rows only when asked for by status
    pub async fn attendees(&self, event_id: i64, status: Option<ParticipantStatus>, pattern: Option<&str>, limit: i64, offset: i64) -> Result<Vec<Attendee>, ClubHubError> {
        let attendees = sqlx::query_as::<_, Attendee>(&format!(
            r#"
            SELECT p.user_id, pr.full_name, pr.email, pr.student_id, pr.avatar_url,
                   p.status, p.registered_at, p.checked_in_at
            FROM event_participants p
            JOIN profiles pr ON pr.id = p.user_id
            {ATTENDEE_FILTER}
            ORDER BY pr.full_name ASC, p.registered_at ASC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(event_id)
        .bind(status)
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(attendees)
    }

    /// Count attendees matching the same filter as `attendees`
    pub async fn count_attendees(&self, event_id: i64, status: Option<ParticipantStatus>, pattern: Option<&str>) -> Result<i64, ClubHubError> {
        let count: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM event_participants p JOIN profiles pr ON pr.id = p.user_id {ATTENDEE_FILTER}"
        ))
        .bind(event_id)
        .bind(status)
        .bind(pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Every non-cancelled attendee, for export
    pub async fn all_attendees(&self, event_id: i64) -> Result<Vec<Attendee>, ClubHubError> {
        let attendees = sqlx::query_as::<_, Attendee>(
            r#"
            SELECT p.user_id, pr.full_name, pr.email, pr.student_id, pr.avatar_url,
                   p.status, p.registered_at, p.checked_in_at
            FROM event_participants p
            JOIN profiles pr ON pr.id = p.user_id
            WHERE p.event_id = $1 AND p.status <> 'cancelled'
            ORDER BY pr.full_name ASC
            "#
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attendees)
    }

    /// Mark a registered participant as attended
    pub async fn check_in(&self, event_id: i64, user_id: i64, checked_in_by: i64) -> Result<Option<EventParticipant>, ClubHubError> {
        let participant = sqlx::query_as::<_, EventParticipant>(&format!(
            r#"
            UPDATE event_participants
            SET status = 'attended', checked_in_at = $3, checked_in_by = $4
            WHERE event_id = $1 AND user_id = $2 AND status = 'registered'
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(Utc::now())
        .bind(checked_in_by)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Revert a check-in
    pub async fn undo_check_in(&self, event_id: i64, user_id: i64) -> Result<Option<EventParticipant>, ClubHubError> {
        let participant = sqlx::query_as::<_, EventParticipant>(&format!(
            r#"
            UPDATE event_participants
            SET status = 'registered', checked_in_at = NULL, checked_in_by = NULL
            WHERE event_id = $1 AND user_id = $2 AND status = 'attended'
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Registration counts by status
    pub async fn status_counts(&self, event_id: i64) -> Result<StatusCounts, ClubHubError> {
        let counts = sqlx::query_as::<_, StatusCounts>(
            r#"
            SELECT COUNT(*) FILTER (WHERE status = 'registered') AS registered,
                   COUNT(*) FILTER (WHERE status = 'attended') AS attended,
                   COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled
            FROM event_participants
            WHERE event_id = $1
            "#
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}
