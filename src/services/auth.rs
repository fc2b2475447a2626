//! Authentication service implementation
//!
//! This service handles password hashing, bearer token issuing and
//! verification, and role-based access control for clubs.

use std::collections::HashSet;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::config::settings::Settings;
use crate::database::repositories::{ClubRepository, UserRepository};
use crate::models::{User, UserRole};
use crate::utils::errors::{ClubHubError, Result};

/// Permission levels for different operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Any signed-in, active account
    User,
    /// Member of the club in context
    ClubMember,
    /// Admin of the club in context
    ClubAdmin,
    /// Platform-wide administration
    SystemAdmin,
}

/// Authentication context for a user, optionally scoped to one club
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub club_id: Option<i64>,
    pub role: UserRole,
    pub permissions: HashSet<Permission>,
    pub is_system_admin: bool,
    pub is_club_admin: bool,
    pub is_club_member: bool,
}

impl AuthContext {
    /// Build the permission set from the facts known about the user
    pub fn from_parts(user_id: i64, club_id: Option<i64>, role: UserRole, is_club_member: bool, is_club_admin: bool) -> Self {
        let is_system_admin = role == UserRole::SystemAdmin;
        let mut permissions = HashSet::new();
        permissions.insert(Permission::User);

        if is_club_member || is_club_admin || is_system_admin {
            permissions.insert(Permission::ClubMember);
        }
        if is_club_admin || is_system_admin {
            permissions.insert(Permission::ClubAdmin);
        }
        if is_system_admin {
            permissions.insert(Permission::SystemAdmin);
        }

        Self {
            user_id,
            club_id,
            role,
            permissions,
            is_system_admin,
            is_club_admin,
            is_club_member,
        }
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Require a permission or return `PermissionDenied`
    pub fn require(&self, permission: Permission) -> Result<()> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(ClubHubError::PermissionDenied(format!(
                "User {} lacks required permission: {:?}",
                self.user_id, permission
            )))
        }
    }
}

/// Bearer token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

/// Authentication service for managing credentials and access control
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    clubs: ClubRepository,
    settings: Settings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(users: UserRepository, clubs: ClubRepository, settings: Settings) -> Self {
        let secret = settings.auth.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            users,
            clubs,
            settings,
        }
    }

    /// Hash a password with Argon2 on the blocking pool
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_password_sync(&password))
            .await
            .map_err(|e| ClubHubError::ServiceUnavailable(format!("Hashing task failed: {}", e)))?
    }

    /// Verify a password against a stored hash on the blocking pool
    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_password_sync(&password, &hash))
            .await
            .map_err(|e| ClubHubError::ServiceUnavailable(format!("Hashing task failed: {}", e)))
    }

    /// Issue a signed token for the user
    pub fn issue_token(&self, user: &User) -> Result<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.settings.auth.token_ttl_seconds as i64);
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        debug!(user_id = user.id, "Token issued");
        Ok((token, expires_at))
    }

    /// Verify signature and expiry of a token
    pub fn decode_token(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    /// Load the user behind a request and reject deactivated accounts
    pub async fn active_user(&self, user_id: i64) -> Result<User> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ClubHubError::Unauthorized("Account no longer exists".to_string()))?;

        if !user.is_active {
            warn!(user_id = user_id, "Request from deactivated account");
            return Err(ClubHubError::PermissionDenied("Account is deactivated".to_string()));
        }

        Ok(user)
    }

    /// Get authentication context for a user, scoped to a club when given
    pub async fn get_auth_context(&self, user_id: i64, club_id: Option<i64>) -> Result<AuthContext> {
        let user = self.active_user(user_id).await?;

        let (is_member, is_admin) = match club_id {
            Some(club_id) => futures::try_join!(
                self.clubs.is_member(club_id, user_id),
                self.clubs.is_admin(club_id, user_id)
            )?,
            None => (false, false),
        };

        let context = AuthContext::from_parts(user_id, club_id, user.role, is_member, is_admin);
        debug!(user_id = user_id, club_id = ?club_id, permissions = ?context.permissions, "Authentication context created");
        Ok(context)
    }

    /// Require specific permission or return error
    pub async fn require_permission(&self, user_id: i64, club_id: Option<i64>, required_permission: Permission) -> Result<AuthContext> {
        let context = self.get_auth_context(user_id, club_id).await?;
        context.require(required_permission)?;
        Ok(context)
    }

    /// Require admin rights on a club (system admins always qualify)
    pub async fn require_club_admin(&self, user_id: i64, club_id: i64) -> Result<AuthContext> {
        self.require_permission(user_id, Some(club_id), Permission::ClubAdmin).await
    }

    /// Require system admin rights
    pub async fn require_system_admin(&self, user_id: i64) -> Result<AuthContext> {
        self.require_permission(user_id, None, Permission::SystemAdmin).await
    }

    /// Role assigned at registration
    pub fn initial_role_for(&self, email: &str) -> UserRole {
        if self.settings.is_system_admin_email(email) {
            UserRole::SystemAdmin
        } else {
            UserRole::Student
        }
    }

    /// Log authentication events
    pub fn log_auth_event(&self, user_id: Option<i64>, action: &str, success: bool, details: Option<&str>) {
        if success {
            info!(user_id = ?user_id, action = action, details = details, "Authentication event");
        } else {
            warn!(user_id = ?user_id, action = action, details = details, "Authentication failure");
        }
    }
}

fn hash_password_sync(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ClubHubError::PasswordHash(e.to_string()))
}

fn verify_password_sync(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
