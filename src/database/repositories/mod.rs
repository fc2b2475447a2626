//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod university;
pub mod club;
pub mod event;
pub mod collaboration;
pub mod announcement;
pub mod post;
pub mod notification;
pub mod admin;

// Re-export repositories
pub use user::UserRepository;
pub use university::UniversityRepository;
pub use club::{ClubRepository, MemberRemoval, AdminRevocation};
pub use event::{EventRepository, RegistrationOutcome, StatusCounts};
pub use collaboration::CollaborationRepository;
pub use announcement::AnnouncementRepository;
pub use post::PostRepository;
pub use notification::NotificationRepository;
pub use admin::AdminRepository;
