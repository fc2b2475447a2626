//! University repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::university::{University, CreateUniversityRequest};
use crate::utils::errors::ClubHubError;

#[derive(Clone)]
pub struct UniversityRepository {
    pool: PgPool,
}

impl UniversityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new university
    pub async fn create(&self, request: CreateUniversityRequest) -> Result<University, ClubHubError> {
        let university = sqlx::query_as::<_, University>(
            r#"
            INSERT INTO universities (name, domain, location, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, domain, location, created_at
            "#
        )
        .bind(request.name)
        .bind(request.domain)
        .bind(request.location)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(university)
    }

    /// Find university by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<University>, ClubHubError> {
        let university = sqlx::query_as::<_, University>(
            "SELECT id, name, domain, location, created_at FROM universities WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(university)
    }

    /// List all universities by name
    pub async fn list(&self) -> Result<Vec<University>, ClubHubError> {
        let universities = sqlx::query_as::<_, University>(
            "SELECT id, name, domain, location, created_at FROM universities ORDER BY name ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(universities)
    }
}
