//! # Email Integration
//!
//! Email sending for the password-reset flow.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::errors::{AuthError, AuthResult};

/// SMTP configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,

    pub smtp_port: u16,

    /// Empty means no authentication (local development servers)
    pub smtp_user: String,

    pub smtp_password: String,

    pub from_email: String,

    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_user: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@recordkeep.local".to_string(),
            from_name: "Recordkeep".to_string(),
        }
    }
}

/// Email template types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTemplate {
    /// Link to the reset endpoint, carrying the raw token
    PasswordReset {
        reset_url: String,
        user_email: String,
        valid_minutes: i64,
    },

    /// Password changed notification
    PasswordChanged { user_email: String },
}

impl EmailTemplate {
    /// (to, subject, body)
    pub fn render(&self) -> (String, String, String) {
        match self {
            EmailTemplate::PasswordReset {
                reset_url,
                user_email,
                valid_minutes,
            } => {
                let subject = format!(
                    "Your password reset token (valid for {} minutes)",
                    valid_minutes
                );
                let body = format!(
                    "Forgot your password? Submit a PATCH request with your new password \
                     and passwordConfirm to: {}\n\n\
                     If you didn't forget your password, please ignore this email.",
                    reset_url
                );
                (user_email.clone(), subject, body)
            }
            EmailTemplate::PasswordChanged { user_email } => {
                let subject = "Your password was changed".to_string();
                let body = "Your password was successfully changed.\n\n\
                            If you didn't make this change, please reset your password immediately."
                    .to_string();
                (user_email.clone(), subject, body)
            }
        }
    }
}

/// Email sender trait for abstraction
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, template: EmailTemplate) -> AuthResult<()>;
}

/// Keeps messages in memory. Used in tests and when no SMTP server is configured.
#[derive(Debug, Default)]
pub struct MemoryEmailSender {
    sent: RwLock<Vec<EmailTemplate>>,
    failing: AtomicBool,
}

impl MemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Copy of everything sent so far
    pub fn sent(&self) -> Vec<EmailTemplate> {
        self.sent.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Reset URL of the most recent reset email
    pub fn last_reset_url(&self) -> Option<String> {
        self.sent().into_iter().rev().find_map(|t| match t {
            EmailTemplate::PasswordReset { reset_url, .. } => Some(reset_url),
            _ => None,
        })
    }
}

#[async_trait]
impl EmailSender for MemoryEmailSender {
    async fn send(&self, template: EmailTemplate) -> AuthResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::EmailDelivery("delivery disabled".to_string()));
        }

        let (to, subject, _) = template.render();
        debug!(%to, %subject, "Captured email");

        self.sent
            .write()
            .map_err(|_| AuthError::Storage("Lock poisoned".to_string()))?
            .push(template);
        Ok(())
    }
}

/// SMTP email sender
pub struct SmtpEmailSender {
    config: EmailConfig,
}

impl SmtpEmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, template: EmailTemplate) -> AuthResult<()> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let (to, subject, body) = template.render();

        let email = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|e| AuthError::EmailDelivery(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AuthError::EmailDelivery(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AuthError::EmailDelivery(format!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_user.is_empty() {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_user.clone(),
                self.config.smtp_password.clone(),
            );

            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AuthError::EmailDelivery(format!("SMTP relay error: {}", e)))?
                .credentials(creds)
                .port(self.config.smtp_port)
                .build()
        };

        mailer
            .send(email)
            .await
            .map_err(|e| AuthError::EmailDelivery(format!("Failed to send email: {}", e)))?;

        info!(%to, "Sent email");
        Ok(())
    }
}

/// SMTP sender when configured, in-memory sender otherwise
pub fn create_email_sender(config: Option<EmailConfig>) -> Arc<dyn EmailSender> {
    match config {
        Some(cfg) => Arc::new(SmtpEmailSender::new(cfg)),
        None => Arc::new(MemoryEmailSender::new()),
    }
}
