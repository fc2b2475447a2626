//! Database service layer
//!
//! This module bundles every repository behind one cloneable handle

use crate::database::{
    DatabasePool, UserRepository, UniversityRepository, ClubRepository, EventRepository,
    CollaborationRepository, AnnouncementRepository, PostRepository, NotificationRepository,
    AdminRepository,
};

#[derive(Clone)]
pub struct DatabaseService {
    pub pool: DatabasePool,
    pub users: UserRepository,
    pub universities: UniversityRepository,
    pub clubs: ClubRepository,
    pub events: EventRepository,
    pub collaborations: CollaborationRepository,
    pub announcements: AnnouncementRepository,
    pub posts: PostRepository,
    pub notifications: NotificationRepository,
    pub admin: AdminRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            universities: UniversityRepository::new(pool.clone()),
            clubs: ClubRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            collaborations: CollaborationRepository::new(pool.clone()),
            announcements: AnnouncementRepository::new(pool.clone()),
            posts: PostRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            admin: AdminRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check that the database answers
    pub async fn health_check(&self) -> crate::utils::errors::Result<()> {
        super::connection::health_check(&self.pool).await
    }
}
