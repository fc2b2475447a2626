//! Test fixtures
//!
//! Canonical request payloads used across scenarios. Nothing here touches the
//! database; builders in `helpers::test_data` persist them.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use ClubHub::models::{
    AnnouncementPriority, CreateAnnouncementRequest, CreateClubRequest, CreateCollaborationRequest,
    CreateEventRequest, CreatePostRequest, CreateUniversityRequest, RegisterRequest,
};

/// Registered as a system admin through `auth.system_admin_emails`
pub const ADMIN_EMAIL: &str = "dean@clubhub.test";
pub const PASSWORD: &str = "correct-horse-battery";

pub fn register_request(email: &str, full_name: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        full_name: full_name.to_string(),
        university_id: None,
    }
}

/// Random student; `index` keeps emails unique within a test
pub fn fake_student(index: usize) -> RegisterRequest {
    let full_name: String = Name().fake();
    let email: String = SafeEmail().fake();
    RegisterRequest {
        email: format!("s{}.{}", index, email),
        password: PASSWORD.to_string(),
        full_name,
        university_id: None,
    }
}

pub fn university_request(name: &str) -> CreateUniversityRequest {
    CreateUniversityRequest {
        name: name.to_string(),
        domain: Some("uni.test".to_string()),
        location: Some("Springfield".to_string()),
    }
}

pub fn club_request(name: &str, university_id: Option<i64>) -> CreateClubRequest {
    CreateClubRequest {
        name: name.to_string(),
        description: format!("{} meets weekly to share ideas and projects.", name),
        category: "academic".to_string(),
        university_id,
        logo_url: None,
        contact_email: Some("club@uni.test".to_string()),
        meeting_schedule: Some("Thursdays 18:00".to_string()),
        social_links: None,
        tags: Some(vec!["weekly".to_string(), "Weekly".to_string(), "beginners".to_string()]),
    }
}

/// Public event starting `starts_in_hours` from now, lasting two hours
pub fn event_request(title: &str, starts_in_hours: i64, capacity: Option<i32>) -> CreateEventRequest {
    let starts_at = Utc::now() + Duration::hours(starts_in_hours);
    CreateEventRequest {
        title: title.to_string(),
        description: Some("Bring a laptop.".to_string()),
        location: Some("Room 101".to_string()),
        starts_at,
        ends_at: starts_at + Duration::hours(2),
        capacity,
        registration_deadline: None,
        is_public: Some(true),
        image_url: None,
    }
}

pub fn announcement_request(title: &str, priority: AnnouncementPriority) -> CreateAnnouncementRequest {
    CreateAnnouncementRequest {
        title: title.to_string(),
        content: "Details inside.".to_string(),
        priority: Some(priority),
        is_pinned: Some(false),
    }
}

pub fn collaboration_request(target_club_id: i64) -> CreateCollaborationRequest {
    CreateCollaborationRequest {
        target_club_id,
        title: "Joint hackathon".to_string(),
        message: Some("Shall we co-host in spring?".to_string()),
    }
}

pub fn post_request(content: &str) -> CreatePostRequest {
    CreatePostRequest {
        content: content.to_string(),
        image_url: None,
    }
}
