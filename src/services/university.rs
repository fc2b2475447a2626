//! University directory service

use tracing::info;
use crate::database::repositories::{ClubRepository, UniversityRepository};
use crate::models::{ClubSummary, CreateUniversityRequest, University};
use crate::services::redis::{RedisService, UNIVERSITIES_KEY};
use crate::utils::errors::{ClubHubError, Result};
use crate::utils::helpers;

#[derive(Clone)]
pub struct UniversityService {
    universities: UniversityRepository,
    clubs: ClubRepository,
    redis: RedisService,
}

impl UniversityService {
    pub fn new(universities: UniversityRepository, clubs: ClubRepository, redis: RedisService) -> Self {
        Self { universities, clubs, redis }
    }

    /// All universities by name, served from cache when possible
    pub async fn list(&self) -> Result<Vec<University>> {
        let universities = self.universities.clone();
        self.redis
            .cached(UNIVERSITIES_KEY, None, move || async move { universities.list().await })
            .await
    }

    pub async fn get(&self, id: i64) -> Result<University> {
        self.universities
            .find_by_id(id)
            .await?
            .ok_or_else(|| ClubHubError::not_found("university", id))
    }

    pub async fn create(&self, request: CreateUniversityRequest) -> Result<University> {
        let request = CreateUniversityRequest {
            name: helpers::require_text("Name", &request.name, 2, 200)?,
            domain: helpers::optional_text("Domain", request.domain.as_deref(), 255)?
                .map(|d| d.to_lowercase()),
            location: helpers::optional_text("Location", request.location.as_deref(), 200)?,
        };

        let university = self.universities.create(request).await.map_err(|e| {
            if e.is_unique_violation() {
                ClubHubError::Conflict("A university with this name already exists".to_string())
            } else {
                e
            }
        })?;

        self.redis.invalidate(UNIVERSITIES_KEY).await;
        info!(university_id = university.id, name = %university.name, "University created");
        Ok(university)
    }

    /// Approved clubs of a university
    pub async fn list_clubs(&self, university_id: i64) -> Result<Vec<ClubSummary>> {
        self.get(university_id).await?;
        self.clubs.university_clubs(university_id).await
    }
}
