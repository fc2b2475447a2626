//! Club collaboration repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::collaboration::{Collaboration, CollaborationStatus, CollaborationWithClubs};
use crate::utils::errors::ClubHubError;

const COLLABORATION_COLUMNS: &str = "id, requester_club_id, target_club_id, title, message, status, requested_by, responded_by, responded_at, created_at";

#[derive(Clone)]
pub struct CollaborationRepository {
    pool: PgPool,
}

impl CollaborationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending request
    pub async fn create(&self, requester_club_id: i64, target_club_id: i64, title: String, message: Option<String>, requested_by: i64) -> Result<Collaboration, ClubHubError> {
        let collaboration = sqlx::query_as::<_, Collaboration>(&format!(
            r#"
            INSERT INTO club_collaborations (requester_club_id, target_club_id, title, message, status, requested_by, created_at)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6)
            RETURNING {COLLABORATION_COLUMNS}
            "#
        ))
        .bind(requester_club_id)
        .bind(target_club_id)
        .bind(title)
        .bind(message)
        .bind(requested_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(collaboration)
    }

    /// Find collaboration by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Collaboration>, ClubHubError> {
        let collaboration = sqlx::query_as::<_, Collaboration>(&format!(
            "SELECT {COLLABORATION_COLUMNS} FROM club_collaborations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(collaboration)
    }

    /// Whether a pending request exists between two clubs in either direction
    pub async fn pending_exists(&self, club_a: i64, club_b: i64) -> Result<bool, ClubHubError> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM club_collaborations
                WHERE status = 'pending'
                  AND LEAST(requester_club_id, target_club_id) = LEAST($1::BIGINT, $2::BIGINT)
                  AND GREATEST(requester_club_id, target_club_id) = GREATEST($1::BIGINT, $2::BIGINT)
            )
            "#
        )
        .bind(club_a)
        .bind(club_b)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    /// Move a pending request to a final status; `None` if it was no longer pending
    pub async fn resolve(&self, id: i64, status: CollaborationStatus, responded_by: i64) -> Result<Option<Collaboration>, ClubHubError> {
        let collaboration = sqlx::query_as::<_, Collaboration>(&format!(
            r#"
            UPDATE club_collaborations
            SET status = $2, responded_by = $3, responded_at = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING {COLLABORATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(responded_by)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(collaboration)
    }

    /// Incoming and outgoing requests of a club, newest first
    pub async fn list_for_club(&self, club_id: i64, status: Option<CollaborationStatus>) -> Result<Vec<CollaborationWithClubs>, ClubHubError> {
        let collaborations = sqlx::query_as::<_, CollaborationWithClubs>(
            r#"
            SELECT cc.id, cc.requester_club_id, cc.target_club_id, cc.title, cc.message, cc.status,
                   cc.requested_by, cc.responded_by, cc.responded_at, cc.created_at,
                   rc.name AS requester_club_name,
                   tc.name AS target_club_name
            FROM club_collaborations cc
            JOIN clubs rc ON rc.id = cc.requester_club_id
            JOIN clubs tc ON tc.id = cc.target_club_id
            WHERE (cc.requester_club_id = $1 OR cc.target_club_id = $1)
              AND ($2::collaboration_status IS NULL OR cc.status = $2)
            ORDER BY cc.created_at DESC
            "#
        )
        .bind(club_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(collaborations)
    }

    /// Pending requests addressed to a club
    pub async fn count_pending_incoming(&self, club_id: i64) -> Result<i64, ClubHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM club_collaborations WHERE target_club_id = $1 AND status = 'pending'"
        )
        .bind(club_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
