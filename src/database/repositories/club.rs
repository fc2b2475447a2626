//! Club repository implementation
//!
//! Clubs, their members and their admin grants live together here, the same
//! way the three tables are always read together.

use sqlx::PgPool;
use chrono::Utc;
use crate::models::club::{
    Club, ClubAdmin, ClubMember, ClubStatus, ClubSummary, CreateClubRequest, MemberRole,
    MemberWithProfile, UpdateClubRequest,
};
use crate::models::dashboard::GrowthPoint;
use crate::utils::errors::ClubHubError;

const CLUB_COLUMNS: &str = "id, name, description, category, university_id, status, logo_url, contact_email, meeting_schedule, social_links, tags, created_by, reviewed_by, reviewed_at, rejection_reason, created_at, updated_at";

const SUMMARY_SELECT: &str = r#"
    SELECT c.id, c.name, c.description, c.category, c.university_id, c.status, c.logo_url,
           c.contact_email, c.meeting_schedule, c.social_links, c.tags, c.created_by,
           c.reviewed_by, c.reviewed_at, c.rejection_reason, c.created_at, c.updated_at,
           u.name AS university_name,
           (SELECT COUNT(*) FROM club_members m WHERE m.club_id = c.id) AS member_count,
           (SELECT COUNT(*) FROM events e
              WHERE e.club_id = c.id AND NOT e.is_cancelled AND e.starts_at >= NOW()) AS event_count
    FROM clubs c
    LEFT JOIN universities u ON u.id = c.university_id
"#;

const DIRECTORY_FILTER: &str = r#"
    WHERE c.status = 'approved'
      AND ($1::BIGINT IS NULL OR c.university_id = $1)
      AND ($2::TEXT IS NULL OR c.category = $2)
      AND ($3::TEXT IS NULL
           OR c.name ILIKE $3
           OR c.description ILIKE $3
           OR EXISTS (SELECT 1 FROM unnest(c.tags) AS t(tag) WHERE t.tag ILIKE $3))
"#;

/// Result of removing a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRemoval {
    Removed { was_admin: bool },
    NotMember,
    LastAdmin,
}

/// Result of revoking an admin grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRevocation {
    Revoked,
    NotAdmin,
    LastAdmin,
}

#[derive(Clone)]
pub struct ClubRepository {
    pool: PgPool,
}

impl ClubRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a club; its founder becomes admin and president in the same transaction
    pub async fn create_with_founder(&self, request: CreateClubRequest, status: ClubStatus, founder_id: i64) -> Result<Club, ClubHubError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let club = sqlx::query_as::<_, Club>(&format!(
            r#"
            INSERT INTO clubs (name, description, category, university_id, status, logo_url, contact_email,
                               meeting_schedule, social_links, tags, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {CLUB_COLUMNS}
            "#
        ))
        .bind(request.name)
        .bind(request.description)
        .bind(request.category)
        .bind(request.university_id)
        .bind(status)
        .bind(request.logo_url)
        .bind(request.contact_email)
        .bind(request.meeting_schedule)
        .bind(request.social_links.unwrap_or_else(|| serde_json::json!({})))
        .bind(request.tags.unwrap_or_default())
        .bind(founder_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO club_admins (club_id, user_id, granted_by, created_at) VALUES ($1, $2, $2, $3)")
            .bind(club.id)
            .bind(founder_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO club_members (club_id, user_id, role, joined_at) VALUES ($1, $2, $3, $4)")
            .bind(club.id)
            .bind(founder_id)
            .bind(MemberRole::President)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE profiles SET role = 'club_admin', updated_at = $2 WHERE id = $1 AND role = 'student'")
            .bind(founder_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(club)
    }

    /// Find club by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Club>, ClubHubError> {
        let club = sqlx::query_as::<_, Club>(&format!("SELECT {CLUB_COLUMNS} FROM clubs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(club)
    }

    /// Find club with directory information
    pub async fn find_summary(&self, id: i64) -> Result<Option<ClubSummary>, ClubHubError> {
        let club = sqlx::query_as::<_, ClubSummary>(&format!("{SUMMARY_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(club)
    }

    /// Approved clubs matching the directory filter
    pub async fn browse(&self, university_id: Option<i64>, category: Option<&str>, pattern: Option<&str>, limit: i64, offset: i64) -> Result<Vec<ClubSummary>, ClubHubError> {
        let clubs = sqlx::query_as::<_, ClubSummary>(&format!(
            "{SUMMARY_SELECT} {DIRECTORY_FILTER} ORDER BY c.name ASC LIMIT $4 OFFSET $5"
        ))
        .bind(university_id)
        .bind(category)
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(clubs)
    }

    /// Count approved clubs matching the directory filter
    pub async fn count_browse(&self, university_id: Option<i64>, category: Option<&str>, pattern: Option<&str>) -> Result<i64, ClubHubError> {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM clubs c {DIRECTORY_FILTER}"))
            .bind(university_id)
            .bind(category)
            .bind(pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Clubs in a given review state, oldest first
    pub async fn list_by_status(&self, status: ClubStatus) -> Result<Vec<ClubSummary>, ClubHubError> {
        let clubs = sqlx::query_as::<_, ClubSummary>(&format!(
            "{SUMMARY_SELECT} WHERE c.status = $1 ORDER BY c.created_at ASC"
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(clubs)
    }

    /// Clubs the user is a member of
    pub async fn user_clubs(&self, user_id: i64) -> Result<Vec<ClubSummary>, ClubHubError> {
        let clubs = sqlx::query_as::<_, ClubSummary>(&format!(
            r#"{SUMMARY_SELECT}
            WHERE EXISTS (SELECT 1 FROM club_members cm WHERE cm.club_id = c.id AND cm.user_id = $1)
            ORDER BY c.name ASC"#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(clubs)
    }

    /// Clubs the user administers, in any review state
    pub async fn admin_clubs(&self, user_id: i64) -> Result<Vec<ClubSummary>, ClubHubError> {
        let clubs = sqlx::query_as::<_, ClubSummary>(&format!(
            r#"{SUMMARY_SELECT}
            WHERE EXISTS (SELECT 1 FROM club_admins ca WHERE ca.club_id = c.id AND ca.user_id = $1)
            ORDER BY c.name ASC"#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(clubs)
    }

    /// IDs of clubs the user administers
    pub async fn admin_club_ids(&self, user_id: i64) -> Result<Vec<i64>, ClubHubError> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT club_id FROM club_admins WHERE user_id = $1 ORDER BY club_id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Update club profile; absent fields keep their value
    pub async fn update(&self, id: i64, request: UpdateClubRequest) -> Result<Club, ClubHubError> {
        let club = sqlx::query_as::<_, Club>(&format!(
            r#"
            UPDATE clubs
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                logo_url = COALESCE($5, logo_url),
                contact_email = COALESCE($6, contact_email),
                meeting_schedule = COALESCE($7, meeting_schedule),
                social_links = COALESCE($8, social_links),
                tags = COALESCE($9, tags),
                updated_at = $10
            WHERE id = $1
            RETURNING {CLUB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.name)
        .bind(request.description)
        .bind(request.category)
        .bind(request.logo_url)
        .bind(request.contact_email)
        .bind(request.meeting_schedule)
        .bind(request.social_links)
        .bind(request.tags)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(club)
    }

    /// Record a review; only a pending club changes, otherwise `None`
    pub async fn review(&self, id: i64, status: ClubStatus, reviewer_id: i64, reason: Option<String>) -> Result<Option<Club>, ClubHubError> {
        let now = Utc::now();
        let club = sqlx::query_as::<_, Club>(&format!(
            r#"
            UPDATE clubs
            SET status = $2, reviewed_by = $3, reviewed_at = $4, rejection_reason = $5, updated_at = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING {CLUB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(reviewer_id)
        .bind(now)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?;

        Ok(club)
    }

    /// Delete club; members, events and posts cascade
    pub async fn delete(&self, id: i64) -> Result<bool, ClubHubError> {
        let result = sqlx::query("DELETE FROM clubs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Approved clubs of one university
    pub async fn university_clubs(&self, university_id: i64) -> Result<Vec<ClubSummary>, ClubHubError> {
        let clubs = sqlx::query_as::<_, ClubSummary>(&format!(
            "{SUMMARY_SELECT} WHERE c.university_id = $1 AND c.status = 'approved' ORDER BY c.name ASC"
        ))
        .bind(university_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(clubs)
    }

    /// Add member to club
    pub async fn add_member(&self, club_id: i64, user_id: i64, role: MemberRole) -> Result<ClubMember, ClubHubError> {
        let member = sqlx::query_as::<_, ClubMember>(
            r#"
            INSERT INTO club_members (club_id, user_id, role, joined_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, club_id, user_id, role, joined_at
            "#
        )
        .bind(club_id)
        .bind(user_id)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(member)
    }

    /// Find one membership row
    pub async fn find_member(&self, club_id: i64, user_id: i64) -> Result<Option<ClubMember>, ClubHubError> {
        let member = sqlx::query_as::<_, ClubMember>(
            "SELECT id, club_id, user_id, role, joined_at FROM club_members WHERE club_id = $1 AND user_id = $2"
        )
        .bind(club_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Check if user is member of club
    pub async fn is_member(&self, club_id: i64, user_id: i64) -> Result<bool, ClubHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM club_members WHERE club_id = $1 AND user_id = $2"
        )
        .bind(club_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Remove a member and any admin grant they hold
    ///
    /// With `protect_last_admin` set, the sole remaining admin is kept.
    pub async fn remove_member(&self, club_id: i64, user_id: i64, protect_last_admin: bool) -> Result<MemberRemoval, ClubHubError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent leave/remove calls on the same club.
        sqlx::query("SELECT id FROM clubs WHERE id = $1 FOR UPDATE")
            .bind(club_id)
            .execute(&mut *tx)
            .await?;

        let is_admin: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM club_admins WHERE club_id = $1 AND user_id = $2)"
        )
        .bind(club_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if is_admin.0 && protect_last_admin {
            let admins: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM club_admins WHERE club_id = $1")
                .bind(club_id)
                .fetch_one(&mut *tx)
                .await?;
            if admins.0 <= 1 {
                return Ok(MemberRemoval::LastAdmin);
            }
        }

        let deleted = sqlx::query("DELETE FROM club_members WHERE club_id = $1 AND user_id = $2")
            .bind(club_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Ok(MemberRemoval::NotMember);
        }

        sqlx::query("DELETE FROM club_admins WHERE club_id = $1 AND user_id = $2")
            .bind(club_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(MemberRemoval::Removed { was_admin: is_admin.0 })
    }

    /// Members with profile data, optionally filtered by name or email
    pub async fn list_members(&self, club_id: i64, pattern: Option<&str>, limit: i64, offset: i64) -> Result<Vec<MemberWithProfile>, ClubHubError> {
        let members = sqlx::query_as::<_, MemberWithProfile>(
            r#"
            SELECT m.user_id, p.full_name, p.email, p.avatar_url, p.student_id, m.role,
                   EXISTS (SELECT 1 FROM club_admins a WHERE a.club_id = m.club_id AND a.user_id = m.user_id) AS is_admin,
                   m.joined_at
            FROM club_members m
            JOIN profiles p ON p.id = m.user_id
            WHERE m.club_id = $1
              AND ($2::TEXT IS NULL OR p.full_name ILIKE $2 OR p.email ILIKE $2)
            ORDER BY m.role DESC, m.joined_at ASC
            LIMIT $3 OFFSET $4
            "#
        )
        .bind(club_id)
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Count members matching the same filter as `list_members`
    pub async fn count_members(&self, club_id: i64, pattern: Option<&str>) -> Result<i64, ClubHubError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM club_members m
            JOIN profiles p ON p.id = m.user_id
            WHERE m.club_id = $1
              AND ($2::TEXT IS NULL OR p.full_name ILIKE $2 OR p.email ILIKE $2)
            "#
        )
        .bind(club_id)
        .bind(pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// IDs of every member
    pub async fn member_ids(&self, club_id: i64) -> Result<Vec<i64>, ClubHubError> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT user_id FROM club_members WHERE club_id = $1")
            .bind(club_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Update member role
    pub async fn update_member_role(&self, club_id: i64, user_id: i64, role: MemberRole) -> Result<Option<ClubMember>, ClubHubError> {
        let member = sqlx::query_as::<_, ClubMember>(
            r#"
            UPDATE club_members
            SET role = $3
            WHERE club_id = $1 AND user_id = $2
            RETURNING id, club_id, user_id, role, joined_at
            "#
        )
        .bind(club_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Grant admin rights on a club and promote the user's global role
    pub async fn add_admin(&self, club_id: i64, user_id: i64, granted_by: i64) -> Result<ClubAdmin, ClubHubError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let admin = sqlx::query_as::<_, ClubAdmin>(
            r#"
            INSERT INTO club_admins (club_id, user_id, granted_by, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, club_id, user_id, granted_by, created_at
            "#
        )
        .bind(club_id)
        .bind(user_id)
        .bind(granted_by)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE profiles SET role = 'club_admin', updated_at = $2 WHERE id = $1 AND role = 'student'")
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(admin)
    }

    /// Revoke an admin grant, never leaving the club without admins
    pub async fn remove_admin(&self, club_id: i64, user_id: i64) -> Result<AdminRevocation, ClubHubError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM clubs WHERE id = $1 FOR UPDATE")
            .bind(club_id)
            .execute(&mut *tx)
            .await?;

        let admins: Vec<(i64,)> = sqlx::query_as("SELECT user_id FROM club_admins WHERE club_id = $1")
            .bind(club_id)
            .fetch_all(&mut *tx)
            .await?;

        if !admins.iter().any(|a| a.0 == user_id) {
            return Ok(AdminRevocation::NotAdmin);
        }
        if admins.len() <= 1 {
            return Ok(AdminRevocation::LastAdmin);
        }

        sqlx::query("DELETE FROM club_admins WHERE club_id = $1 AND user_id = $2")
            .bind(club_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(AdminRevocation::Revoked)
    }

    /// Check if user administers the club
    pub async fn is_admin(&self, club_id: i64, user_id: i64) -> Result<bool, ClubHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM club_admins WHERE club_id = $1 AND user_id = $2"
        )
        .bind(club_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// IDs of every admin
    pub async fn admin_ids(&self, club_id: i64) -> Result<Vec<i64>, ClubHubError> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT user_id FROM club_admins WHERE club_id = $1")
            .bind(club_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Daily joins for the last `days` days, oldest first
    pub async fn member_growth(&self, club_id: i64, days: i32) -> Result<Vec<GrowthPoint>, ClubHubError> {
        let points = sqlx::query_as::<_, GrowthPoint>(
            r#"
            SELECT d::DATE AS day, COUNT(m.id) AS joined
            FROM generate_series(CURRENT_DATE - ($2::INT - 1) * INTERVAL '1 day', CURRENT_DATE, INTERVAL '1 day') AS d
            LEFT JOIN club_members m ON m.club_id = $1 AND m.joined_at::DATE = d::DATE
            GROUP BY d
            ORDER BY d ASC
            "#
        )
        .bind(club_id)
        .bind(days)
        .fetch_all(&self.pool)
        .await?;

        Ok(points)
    }
}
