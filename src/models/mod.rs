//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod university;
pub mod club;
pub mod event;
pub mod collaboration;
pub mod announcement;
pub mod post;
pub mod notification;
pub mod dashboard;

// Re-export commonly used models
pub use user::{User, UserRole, CreateUserRequest, RegisterRequest, LoginRequest, AuthResponse, UpdateProfileRequest, AdminUpdateUserRequest, UserFilter};
pub use university::{University, CreateUniversityRequest};
pub use club::{Club, ClubStatus, ClubSummary, ClubMember, MemberRole, MemberWithProfile, ClubAdmin, CreateClubRequest, UpdateClubRequest, ClubFilter, ReviewDecision, RejectClubRequest, MembershipStatus, UpdateMemberRoleRequest, MemberFilter, CLUB_CATEGORIES};
pub use event::{Event, EventSummary, EventParticipant, ParticipantStatus, RegisteredEvent, Attendee, AttendeeList, AttendanceSummary, CreateEventRequest, UpdateEventRequest, EventFilter, AttendeeFilter, CalendarLink};
pub use collaboration::{Collaboration, CollaborationStatus, CollaborationWithClubs, CreateCollaborationRequest, CollaborationFilter};
pub use announcement::{Announcement, AnnouncementPriority, AnnouncementWithAuthor, CreateAnnouncementRequest, UpdateAnnouncementRequest};
pub use post::{ActivityPost, PostWithDetails, CreatePostRequest, LikeToggle};
pub use notification::{Notification, NotificationKind, CreateNotificationRequest, NotificationFilter, UnreadCount};
pub use dashboard::{StudentDashboard, ClubDashboard, GrowthPoint, SystemStats, SystemDashboard};
