//! User profile repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{User, UserRole, CreateUserRequest, UpdateProfileRequest};
use crate::utils::errors::ClubHubError;

const USER_COLUMNS: &str = "id, email, password_hash, full_name, role, university_id, student_id, major, year_of_study, bio, avatar_url, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, ClubHubError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO profiles (email, password_hash, full_name, role, university_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.email)
        .bind(request.password_hash)
        .bind(request.full_name)
        .bind(request.role)
        .bind(request.university_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, ClubHubError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM profiles WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user by email, case-insensitively
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ClubHubError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM profiles WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update profile fields; absent fields keep their value
    pub async fn update_profile(&self, id: i64, request: UpdateProfileRequest) -> Result<User, ClubHubError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE profiles
            SET full_name = COALESCE($2, full_name),
                university_id = COALESCE($3, university_id),
                student_id = COALESCE($4, student_id),
                major = COALESCE($5, major),
                year_of_study = COALESCE($6, year_of_study),
                bio = COALESCE($7, bio),
                avatar_url = COALESCE($8, avatar_url),
                updated_at = $9
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.full_name)
        .bind(request.university_id)
        .bind(request.student_id)
        .bind(request.major)
        .bind(request.year_of_study)
        .bind(request.bio)
        .bind(request.avatar_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Change the global role
    pub async fn set_role(&self, id: i64, role: UserRole) -> Result<User, ClubHubError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE profiles SET role = $2, updated_at = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Demote a club admin who no longer administers any club
    pub async fn demote_if_no_clubs(&self, id: i64) -> Result<(), ClubHubError> {
        sqlx::query(
            r#"
            UPDATE profiles SET role = 'student', updated_at = $2
            WHERE id = $1 AND role = 'club_admin'
              AND NOT EXISTS (SELECT 1 FROM club_admins WHERE user_id = $1)
            "#
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Activate or deactivate an account
    pub async fn set_active(&self, id: i64, is_active: bool) -> Result<User, ClubHubError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE profiles SET is_active = $2, updated_at = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(is_active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// List users, optionally filtered by name or email
    pub async fn list(&self, search: Option<&str>, limit: i64, offset: i64) -> Result<Vec<User>, ClubHubError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM profiles
            WHERE ($1::TEXT IS NULL OR full_name ILIKE $1 OR email ILIKE $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Count users matching the same filter as `list`
    pub async fn count(&self, search: Option<&str>) -> Result<i64, ClubHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM profiles WHERE ($1::TEXT IS NULL OR full_name ILIKE $1 OR email ILIKE $1)"
        )
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Newest accounts
    pub async fn newest(&self, limit: i64) -> Result<Vec<User>, ClubHubError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM profiles ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
