//! System-wide statistics repository

use sqlx::PgPool;
use crate::models::dashboard::SystemStats;
use crate::utils::errors::ClubHubError;

#[derive(Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get statistics
    pub async fn get_stats(&self) -> Result<SystemStats, ClubHubError> {
        let stats = sqlx::query_as::<_, SystemStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM profiles) AS total_users,
                (SELECT COUNT(*) FROM profiles WHERE is_active) AS active_users,
                (SELECT COUNT(*) FROM clubs WHERE status = 'pending') AS pending_clubs,
                (SELECT COUNT(*) FROM clubs WHERE status = 'approved') AS approved_clubs,
                (SELECT COUNT(*) FROM clubs WHERE status = 'rejected') AS rejected_clubs,
                (SELECT COUNT(*) FROM events) AS total_events,
                (SELECT COUNT(*) FROM events WHERE NOT is_cancelled AND starts_at >= NOW()) AS upcoming_events,
                (SELECT COUNT(*) FROM event_participants WHERE status <> 'cancelled') AS active_registrations,
                (SELECT COUNT(*) FROM club_collaborations WHERE status = 'pending') AS pending_collaborations
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
