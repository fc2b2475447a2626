//! Services module
//!
//! This module contains business logic services

pub mod announcement;
pub mod attendance;
pub mod auth;
pub mod club;
pub mod collaboration;
pub mod dashboard;
pub mod event;
pub mod feed;
pub mod membership;
pub mod notification;
pub mod redis;
pub mod university;
pub mod user;
pub mod wizard;

// Re-export commonly used services
pub use announcement::AnnouncementService;
pub use attendance::AttendanceService;
pub use auth::{AuthContext, AuthService, Claims, Permission};
pub use club::ClubService;
pub use collaboration::{CollaborationResponse, CollaborationService};
pub use dashboard::DashboardService;
pub use event::EventService;
pub use feed::FeedService;
pub use membership::MembershipService;
pub use notification::{MessageTemplate, NotificationService};
pub use redis::RedisService;
pub use university::UniversityService;
pub use user::UserService;
pub use wizard::{WizardService, WizardState, WizardStepInput};

use serde::Serialize;
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::state::StateStorage;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub db: DatabaseService,
    pub redis: RedisService,
    pub auth: AuthService,
    pub users: UserService,
    pub universities: UniversityService,
    pub clubs: ClubService,
    pub membership: MembershipService,
    pub events: EventService,
    pub attendance: AttendanceService,
    pub collaborations: CollaborationService,
    pub announcements: AnnouncementService,
    pub feed: FeedService,
    pub notifications: NotificationService,
    pub dashboard: DashboardService,
    pub wizard: WizardService,
}

impl ServiceFactory {
    /// Wire every service over one database handle; Redis is connected lazily
    pub fn new(db: DatabaseService, settings: Settings) -> Result<Self> {
        let redis = RedisService::new(settings.clone())?;
        let storage = StateStorage::new(settings.redis.clone())?;

        let auth = AuthService::new(db.users.clone(), db.clubs.clone(), settings.clone());
        let notifications = NotificationService::new(db.notifications.clone(), settings.clone());
        let users = UserService::new(db.users.clone(), auth.clone(), settings.clone());
        let universities = UniversityService::new(db.universities.clone(), db.clubs.clone(), redis.clone());
        let clubs = ClubService::new(
            db.clubs.clone(),
            db.users.clone(),
            auth.clone(),
            notifications.clone(),
            redis.clone(),
            settings.clone(),
        );
        let membership = MembershipService::new(
            db.clubs.clone(),
            db.users.clone(),
            clubs.clone(),
            auth.clone(),
            notifications.clone(),
            redis.clone(),
            settings.clone(),
        );
        let events = EventService::new(
            db.events.clone(),
            db.clubs.clone(),
            clubs.clone(),
            auth.clone(),
            notifications.clone(),
            redis.clone(),
            settings.clone(),
        );
        let attendance = AttendanceService::new(db.events.clone(), auth.clone(), settings.clone());
        let collaborations = CollaborationService::new(
            db.collaborations.clone(),
            db.clubs.clone(),
            clubs.clone(),
            auth.clone(),
            notifications.clone(),
            settings.clone(),
        );
        let announcements = AnnouncementService::new(
            db.announcements.clone(),
            db.clubs.clone(),
            clubs.clone(),
            auth.clone(),
            notifications.clone(),
        );
        let feed = FeedService::new(db.posts.clone(), clubs.clone(), auth.clone(), settings);
        let dashboard = DashboardService::new(db.clone(), auth.clone());
        let wizard = WizardService::new(storage, clubs.clone(), auth.clone());

        Ok(Self {
            db,
            redis,
            auth,
            users,
            universities,
            clubs,
            membership,
            events,
            attendance,
            collaborations,
            announcements,
            feed,
            notifications,
            dashboard,
            wizard,
        })
    }

    /// Health check for the backing stores
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let (database, redis) = futures::join!(self.db.health_check(), self.redis.health_check());

        ServiceHealthStatus {
            database_healthy: database.is_ok(),
            redis_healthy: redis.unwrap_or(false),
        }
    }
}

/// Health status of the backing stores
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub redis_healthy: bool,
}

impl ServiceHealthStatus {
    /// Redis is a cache; only the database is critical
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        if !self.redis_healthy {
            issues.push("Redis connection failed".to_string());
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_issues() {
        let status = ServiceHealthStatus { database_healthy: true, redis_healthy: false };
        assert!(status.is_healthy());
        assert_eq!(status.get_issues(), vec!["Redis connection failed".to_string()]);

        let status = ServiceHealthStatus { database_healthy: false, redis_healthy: true };
        assert!(!status.is_healthy());
    }
}
