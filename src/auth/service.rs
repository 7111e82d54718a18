//! # Auth Service
//!
//! Registration, login, token authentication, password reset and profile
//! management on top of a [`UserRepository`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use validator::{Validate, ValidateEmail};

use super::crypto::{generate_token, hash_password, hash_token, verify_password, PasswordPolicy};
use super::email::{EmailSender, EmailTemplate};
use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtConfig, JwtManager};
use super::user::{NewUser, User, UserRepository};

/// Auth settings, loaded as the `auth` section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,

    pub jwt_expiration_days: i64,

    /// Lifetime of the `jwt` cookie
    pub cookie_expiration_days: i64,

    pub reset_token_ttl_minutes: i64,

    pub issuer: String,

    pub audience: String,

    /// Base URL used in reset links; the request's Host header otherwise
    pub public_url: Option<String>,

    /// Mark the `jwt` cookie `Secure`
    pub secure_cookies: bool,

    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "CHANGE_THIS_SECRET_IN_PRODUCTION".to_string(),
            jwt_expiration_days: 90,
            cookie_expiration_days: 90,
            reset_token_ttl_minutes: 10,
            issuer: "recordkeep".to_string(),
            audience: "recordkeep".to_string(),
            public_url: None,
            secure_cookies: false,
            min_password_length: 8,
        }
    }
}

/// A signed token and when it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be 1 to 50 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Last name must be 1 to 50 characters"))]
    pub last_name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Username must be 1 to 50 characters"))]
    pub username: Option<String>,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    pub password: String,

    pub password_confirm: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(alias = "passwordCurrent")]
    pub current_password: String,
    pub password: String,
    pub password_confirm: String,
}

/// Fields a profile update may change
const PROFILE_FIELDS: &[&str] = &["firstName", "lastName", "email", "username"];

/// Fields that route a profile update to the password endpoint instead
const PASSWORD_FIELDS: &[&str] = &["password", "passwordConfirm"];

/// Authentication service
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtManager,
    policy: PasswordPolicy,
    mailer: Arc<dyn EmailSender>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        let jwt = JwtManager::new(JwtConfig {
            secret: config.jwt_secret.clone(),
            ttl: Duration::days(config.jwt_expiration_days),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        });
        let policy = PasswordPolicy {
            min_length: config.min_password_length,
        };

        Self {
            users,
            jwt,
            policy,
            mailer,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Sign a token for `user`
    pub fn issue(&self, user: &User) -> AuthResult<IssuedToken> {
        let (token, expires_at) = self.jwt.sign(user)?;
        Ok(IssuedToken { token, expires_at })
    }

    pub fn register(&self, request: RegisterRequest) -> AuthResult<(User, IssuedToken)> {
        self.policy
            .validate(&request.password, &request.password_confirm)?;

        let email = request.email.trim().to_lowercase();
        if self.users.find_by_email(&email)?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let user = self.users.create(NewUser {
            first_name: request.first_name,
            last_name: request.last_name,
            username: request.username,
            email,
            password: hash_password(&request.password)?,
        })?;

        info!(user_id = %user.id, "Registered user");
        let token = self.issue(&user)?;
        Ok((user, token))
    }

    pub fn login(&self, request: LoginRequest) -> AuthResult<(User, IssuedToken)> {
        let (Some(email), Some(password)) = (
            request.email.filter(|e| !e.is_empty()),
            request.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::MissingCredentials);
        };

        let user = self
            .users
            .find_by_email(&email.trim().to_lowercase())?
            .filter(|user| verify_password(&password, &user.password))
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.issue(&user)?;
        Ok((user, token))
    }

    /// Resolve a bearer token to its (still valid) user
    pub fn authenticate(&self, token: &str) -> AuthResult<User> {
        let claims = self.jwt.verify(token)?;

        let user = self
            .users
            .find_by_id(&claims.sub)?
            .ok_or(AuthError::UserNoLongerExists)?;

        if user.changed_password_after(claims.iat) {
            return Err(AuthError::PasswordChangedAfterToken);
        }
        Ok(user)
    }

    /// Store a hashed reset token and email the raw token as a link under `base_url`
    pub async fn forgot_password(&self, request: ForgotPasswordRequest, base_url: &str) -> AuthResult<()> {
        let email = request.email.trim().to_lowercase();
        let mut user = self
            .users
            .find_by_email(&email)?
            .ok_or(AuthError::UserNotFound)?;

        let token = generate_token();
        user.password_reset_token = Some(hash_token(&token));
        user.password_reset_expires =
            Some(Utc::now() + Duration::minutes(self.config.reset_token_ttl_minutes));
        let mut user = self.users.save(&user)?;

        let template = EmailTemplate::PasswordReset {
            reset_url: format!(
                "{}/api/auth/resetPassword/{}",
                base_url.trim_end_matches('/'),
                token
            ),
            user_email: user.email.clone(),
            valid_minutes: self.config.reset_token_ttl_minutes,
        };

        if let Err(e) = self.mailer.send(template).await {
            warn!(user_id = %user.id, error = %e, "Reset email failed, clearing token");
            user.password_reset_token = None;
            user.password_reset_expires = None;
            self.users.save(&user)?;
            return Err(e);
        }

        info!(user_id = %user.id, "Sent password reset token");
        Ok(())
    }

    pub async fn reset_password(
        &self,
        token: &str,
        request: ResetPasswordRequest,
    ) -> AuthResult<(User, IssuedToken)> {
        let mut user = self
            .users
            .find_by_reset_token(&hash_token(token))?
            .filter(|user| {
                user.password_reset_expires
                    .map(|expires| expires > Utc::now())
                    .unwrap_or(false)
            })
            .ok_or(AuthError::InvalidResetToken)?;

        self.policy
            .validate(&request.password, &request.password_confirm)?;

        user.password = hash_password(&request.password)?;
        user.password_reset_token = None;
        user.password_reset_expires = None;
        user.password_changed_at = Some(changed_at());
        let user = self.users.save(&user)?;

        info!(user_id = %user.id, "Reset password");
        self.notify_password_changed(&user).await;

        let token = self.issue(&user)?;
        Ok((user, token))
    }

    /// Apply a profile patch. Only names, username and email are changed.
    pub fn update_profile(&self, user: &User, patch: &Value) -> AuthResult<User> {
        let Some(patch) = patch.as_object() else {
            return Err(AuthError::Validation("Request body must be a JSON object".to_string()));
        };
        if PASSWORD_FIELDS.iter().any(|f| patch.contains_key(*f)) {
            return Err(AuthError::PasswordUpdateNotAllowed);
        }

        let mut updated = user.clone();
        for field in PROFILE_FIELDS {
            let Some(value) = patch.get(*field) else {
                continue;
            };
            let text = value
                .as_str()
                .map(str::trim)
                .ok_or_else(|| AuthError::Validation(format!("{} must be a string", field)))?;

            match *field {
                "email" => {
                    if !text.validate_email() {
                        return Err(AuthError::Validation("Please provide a valid email".to_string()));
                    }
                    updated.email = text.to_lowercase();
                }
                "firstName" => updated.first_name = Some(text.to_string()),
                "lastName" => updated.last_name = Some(text.to_string()),
                _ => updated.username = Some(text.to_string()),
            }
        }

        self.users.save(&updated)
    }

    pub async fn change_password(
        &self,
        user: &User,
        request: ChangePasswordRequest,
    ) -> AuthResult<(User, IssuedToken)> {
        // The middleware copy may be stale; check against the stored hash
        let mut current = self
            .users
            .find_by_id(&user.id)?
            .ok_or(AuthError::UserNoLongerExists)?;

        if !verify_password(&request.current_password, &current.password) {
            return Err(AuthError::CurrentPasswordWrong);
        }
        self.policy
            .validate(&request.password, &request.password_confirm)?;

        current.password = hash_password(&request.password)?;
        current.password_changed_at = Some(changed_at());
        let current = self.users.save(&current)?;

        info!(user_id = %current.id, "Changed password");
        self.notify_password_changed(&current).await;

        let token = self.issue(&current)?;
        Ok((current, token))
    }

    async fn notify_password_changed(&self, user: &User) {
        let template = EmailTemplate::PasswordChanged {
            user_email: user.email.clone(),
        };
        if let Err(e) = self.mailer.send(template).await {
            warn!(user_id = %user.id, error = %e, "Password change notification failed");
        }
    }
}

/// Backdated one second so a token issued right after the change stays valid
fn changed_at() -> DateTime<Utc> {
    Utc::now() - Duration::seconds(1)
}
