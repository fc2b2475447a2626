//! Club activity feed service
//!
//! Posts, likes and the per-user feed. Mirrors the `get_club_posts_with_details`,
//! `create_post` and `toggle_post_like` procedures clients already call.

use tracing::debug;
use crate::config::settings::Settings;
use crate::database::repositories::PostRepository;
use crate::models::{CreatePostRequest, LikeToggle, PostWithDetails};
use crate::services::auth::AuthService;
use crate::services::club::ClubService;
use crate::utils::errors::{ClubHubError, Result};
use crate::utils::helpers::{self, Page, PageRequest};
use crate::utils::logging::log_club_event;

#[derive(Clone)]
pub struct FeedService {
    posts: PostRepository,
    club_service: ClubService,
    auth: AuthService,
    settings: Settings,
}

impl FeedService {
    pub fn new(posts: PostRepository, club_service: ClubService, auth: AuthService, settings: Settings) -> Self {
        Self { posts, club_service, auth, settings }
    }

    fn ensure_enabled(&self) -> Result<()> {
        if self.settings.features.social_feed {
            Ok(())
        } else {
            Err(ClubHubError::FeatureDisabled("social_feed"))
        }
    }

    /// Posts of a club, newest first, with author, like count and the viewer's like
    pub async fn club_posts(&self, viewer: Option<i64>, club_id: i64, page: PageRequest) -> Result<Page<PostWithDetails>> {
        self.ensure_enabled()?;
        self.club_service.get(club_id, viewer).await?;
        let pagination = page.resolve(&self.settings.limits);

        let (items, total) = futures::try_join!(
            self.posts.club_posts(club_id, viewer, pagination.limit(), pagination.offset()),
            self.posts.count_club_posts(club_id)
        )?;

        Ok(Page::new(items, pagination, total))
    }

    /// Publish a post (club admin)
    pub async fn create_post(&self, user_id: i64, club_id: i64, request: CreatePostRequest) -> Result<PostWithDetails> {
        self.ensure_enabled()?;
        self.club_service.club(club_id).await?;
        self.auth.require_club_admin(user_id, club_id).await?;

        let content = helpers::require_text("Content", &request.content, 1, 2000)?;
        let image_url = helpers::optional_url("Image URL", request.image_url.as_deref())?;

        let post = self.posts.create(club_id, user_id, content, image_url).await?;
        log_club_event(club_id, "post_created", Some(user_id), None);

        self.posts
            .find_with_details(post.id, Some(user_id))
            .await?
            .ok_or_else(|| ClubHubError::not_found("post", post.id))
    }

    /// Like or unlike; returns the authoritative state for client reconciliation
    pub async fn toggle_like(&self, user_id: i64, post_id: i64) -> Result<LikeToggle> {
        self.ensure_enabled()?;
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| ClubHubError::not_found("post", post_id))?;
        self.club_service.get(post.club_id, Some(user_id)).await?;

        let toggle = self.posts.toggle_like(post_id, user_id).await?;
        debug!(post_id = post_id, user_id = user_id, liked = toggle.liked, like_count = toggle.like_count, "Post like toggled");
        Ok(toggle)
    }

    /// Delete a post (club admin or its author)
    pub async fn delete_post(&self, user_id: i64, post_id: i64) -> Result<()> {
        self.ensure_enabled()?;
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| ClubHubError::not_found("post", post_id))?;

        if post.author_id != Some(user_id) {
            self.auth.require_club_admin(user_id, post.club_id).await?;
        }

        if !self.posts.delete(post_id).await? {
            return Err(ClubHubError::not_found("post", post_id));
        }
        log_club_event(post.club_id, "post_deleted", Some(user_id), None);
        Ok(())
    }

    /// Posts from every club the caller belongs to
    pub async fn feed_for_user(&self, user_id: i64, page: PageRequest) -> Result<Page<PostWithDetails>> {
        self.ensure_enabled()?;
        let pagination = page.resolve(&self.settings.limits);

        let (items, total) = futures::try_join!(
            self.posts.feed_for_user(user_id, pagination.limit(), pagination.offset()),
            self.posts.count_feed_for_user(user_id)
        )?;

        Ok(Page::new(items, pagination, total))
    }
}
