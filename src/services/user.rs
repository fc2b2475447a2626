//! User service implementation
//!
//! This service handles account registration and login, profile management,
//! and system-admin account administration.

use tracing::{debug, info};
use crate::config::settings::Settings;
use crate::database::repositories::UserRepository;
use crate::models::{
    AdminUpdateUserRequest, AuthResponse, CreateUserRequest, LoginRequest, RegisterRequest,
    UpdateProfileRequest, User, UserFilter, UserRole,
};
use crate::services::auth::AuthService;
use crate::utils::errors::{ClubHubError, Result};
use crate::utils::helpers::{self, Page, PageRequest};
use crate::utils::logging::{log_admin_action, log_user_action};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// User service for managing user operations
#[derive(Clone)]
pub struct UserService {
    user_repository: UserRepository,
    auth: AuthService,
    settings: Settings,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: UserRepository, auth: AuthService, settings: Settings) -> Self {
        Self {
            user_repository,
            auth,
            settings,
        }
    }

    /// Register a new account and sign it in
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        let email = normalize_email(&request.email)?;
        validate_password(&request.password)?;
        let full_name = helpers::require_text("Full name", &request.full_name, 1, 100)?;

        if self.user_repository.find_by_email(&email).await?.is_some() {
            return Err(ClubHubError::Conflict("An account with this email already exists".to_string()));
        }

        let password_hash = self.auth.hash_password(&request.password).await?;
        let role = self.auth.initial_role_for(&email);

        let user = self
            .user_repository
            .create(CreateUserRequest {
                email,
                password_hash,
                full_name,
                role,
                university_id: request.university_id,
            })
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ClubHubError::Conflict("An account with this email already exists".to_string())
                } else {
                    e
                }
            })?;

        info!(user_id = user.id, role = %user.role, "New user registered successfully");
        self.sign_in(user)
    }

    /// Exchange credentials for a token
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        let email = request.email.trim().to_lowercase();

        let user = match self.user_repository.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                self.auth.log_auth_event(None, "login", false, Some("unknown email"));
                return Err(ClubHubError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !self.auth.verify_password(&request.password, &user.password_hash).await? {
            self.auth.log_auth_event(Some(user.id), "login", false, Some("bad password"));
            return Err(ClubHubError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !user.is_active {
            self.auth.log_auth_event(Some(user.id), "login", false, Some("deactivated"));
            return Err(ClubHubError::PermissionDenied("Account is deactivated".to_string()));
        }

        self.auth.log_auth_event(Some(user.id), "login", true, None);
        self.sign_in(user)
    }

    fn sign_in(&self, user: User) -> Result<AuthResponse> {
        let (token, expires_at) = self.auth.issue_token(&user)?;
        Ok(AuthResponse { token, expires_at, user })
    }

    /// Get the caller's own profile
    pub async fn me(&self, user_id: i64) -> Result<User> {
        self.auth.active_user(user_id).await
    }

    /// Update the caller's profile
    pub async fn update_profile(&self, user_id: i64, request: UpdateProfileRequest) -> Result<User> {
        let request = validate_profile(request)?;
        self.auth.active_user(user_id).await?;
        let user = self.user_repository.update_profile(user_id, request).await?;
        log_user_action(user_id, "update_profile", None);
        Ok(user)
    }

    /// List accounts for system admins
    pub async fn list_users(&self, admin_id: i64, filter: &UserFilter) -> Result<Page<User>> {
        self.auth.require_system_admin(admin_id).await?;
        let pagination = PageRequest { page: filter.page, page_size: filter.page_size }
            .resolve(&self.settings.limits);
        let pattern = filter
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(helpers::like_pattern);

        let (items, total) = futures::try_join!(
            self.user_repository.list(pattern.as_deref(), pagination.limit(), pagination.offset()),
            self.user_repository.count(pattern.as_deref())
        )?;

        debug!(total = total, page = pagination.page, "Users listed");
        Ok(Page::new(items, pagination, total))
    }

    /// Apply a system admin's change to another account
    pub async fn admin_update(&self, admin_id: i64, user_id: i64, request: AdminUpdateUserRequest) -> Result<User> {
        if admin_id == user_id {
            if request.role.is_some_and(|role| role != UserRole::SystemAdmin) {
                return Err(ClubHubError::InvalidInput("You cannot change your own role".to_string()));
            }
            if request.is_active == Some(false) {
                return Err(ClubHubError::InvalidInput("You cannot deactivate your own account".to_string()));
            }
        }

        self.auth.require_system_admin(admin_id).await?;
        let mut user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ClubHubError::not_found("user", user_id))?;

        if let Some(role) = request.role {
            user = self.user_repository.set_role(user_id, role).await?;
            log_admin_action(admin_id, "set_role", Some(&user_id.to_string()), Some(role.as_str()));
        }

        if let Some(is_active) = request.is_active {
            user = self.user_repository.set_active(user_id, is_active).await?;
            log_admin_action(
                admin_id,
                if is_active { "activate_user" } else { "deactivate_user" },
                Some(&user_id.to_string()),
                None,
            );
        }

        Ok(user)
    }
}

/// Validate and lower-case an email address
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if !helpers::is_valid_email(&email) {
        return Err(ClubHubError::InvalidInput("Invalid email address".to_string()));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(ClubHubError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(ClubHubError::InvalidInput(format!(
            "Password must be at most {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Trim and check a profile patch
pub fn validate_profile(request: UpdateProfileRequest) -> Result<UpdateProfileRequest> {
    let full_name = match request.full_name.as_deref() {
        Some(name) => Some(helpers::require_text("Full name", name, 1, 100)?),
        None => None,
    };

    if let Some(year) = request.year_of_study {
        if !(1..=8).contains(&year) {
            return Err(ClubHubError::InvalidInput("Year of study must be between 1 and 8".to_string()));
        }
    }

    Ok(UpdateProfileRequest {
        full_name,
        university_id: request.university_id,
        student_id: helpers::optional_text("Student ID", request.student_id.as_deref(), 50)?,
        major: helpers::optional_text("Major", request.major.as_deref(), 100)?,
        year_of_study: request.year_of_study,
        bio: helpers::optional_text("Bio", request.bio.as_deref(), 500)?,
        avatar_url: helpers::optional_url("Avatar URL", request.avatar_url.as_deref())?,
    })
}
