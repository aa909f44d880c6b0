//! Identity operations: register, login, profile

use std::sync::Arc;

use shared::client::{AuthResponse, LoginRequest, RegisterRequest};
use shared::models::{Role, UserProfile};
use validator::Validate;

use crate::auth::{CurrentUser, JwtService};
use crate::db::models::{User, UserCreate};
use crate::db::repository::{RepoError, UserRepository};
use crate::security_log;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Lower-cased, trimmed login key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct IdentityService {
    users: UserRepository,
    jwt: Arc<JwtService>,
}

impl IdentityService {
    pub fn new(users: UserRepository, jwt: Arc<JwtService>) -> Self {
        Self { users, jwt }
    }

    /// Create an account and sign it in
    ///
    /// The caller may choose `role`; it defaults to `user`.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<AuthResponse> {
        let req = RegisterRequest {
            name: req.name.trim().to_string(),
            email: normalize_email(&req.email),
            ..req
        };

        validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&req.email, "email", MAX_EMAIL_LEN)?;
        validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;
        req.validate()
            .map_err(|e| AppError::validation(format!("Invalid registration: {}", e)))?;

        if self.users.find_by_email(&req.email).await?.is_some() {
            security_log!("INFO", "register_duplicate", email = req.email);
            return Err(AppError::email_taken());
        }

        let password_hash = User::hash_password(&req.password)
            .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;

        let email = req.email.clone();
        let user = self
            .users
            .create(UserCreate {
                name: req.name,
                email: req.email,
                password_hash,
                role: req.role.unwrap_or_default(),
            })
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(_) => {
                    security_log!("INFO", "register_duplicate", email = email);
                    AppError::email_taken()
                }
                other => AppError::from(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        self.issue(user)
    }

    /// Verify credentials and issue a token
    ///
    /// Unknown email and wrong password answer identically.
    pub async fn login(&self, req: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&req.email);
        if email.is_empty() || req.password.is_empty() {
            return Err(AppError::invalid_credentials());
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            security_log!("WARN", "login_failed", email = email, reason = "unknown_email");
            return Err(AppError::invalid_credentials());
        };

        let valid = user
            .verify_password(&req.password)
            .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            security_log!("WARN", "login_failed", email = email, reason = "bad_password");
            return Err(AppError::invalid_credentials());
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.issue(user)
    }

    /// Profile of the authenticated caller
    pub fn me(&self, caller: &CurrentUser) -> UserProfile {
        caller.to_profile()
    }

    fn issue(&self, user: User) -> AppResult<AuthResponse> {
        let token = self
            .jwt
            .generate_token(&user.id)
            .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

        Ok(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            token,
        })
    }
}

/// Result of a seed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(String),
    AdminExists,
    EmailTaken,
}

impl IdentityService {
    /// Provision the first admin account
    ///
    /// Does nothing when any admin exists or the email is already in use.
    pub async fn seed_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<SeedOutcome> {
        if self.users.count_by_role(Role::Admin).await? > 0 {
            return Ok(SeedOutcome::AdminExists);
        }
        let email = normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Ok(SeedOutcome::EmailTaken);
        }

        validate_required_text(password, "password", MAX_PASSWORD_LEN)?;
        let password_hash = User::hash_password(password)
            .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;

        let user = self
            .users
            .create(UserCreate {
                name: name.trim().to_string(),
                email,
                password_hash,
                role: Role::Admin,
            })
            .await?;

        tracing::info!(user_id = %user.id, email = %user.email, "Admin user seeded");
        Ok(SeedOutcome::Created(user.id))
    }
}
