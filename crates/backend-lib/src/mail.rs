// ============================
// crates/backend-lib/src/mail.rs
// ============================
//! Outbound mail boundary.
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppError;

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Trait for mail delivery backends
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), AppError>;
}

/// Mailer that only records deliveries in the log.
///
/// Used when no delivery service is wired in (local development).
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), AppError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "outbound mail"
        );
        Ok(())
    }
}

fn describe_ttl(ttl: Duration) -> String {
    let secs = ttl.as_secs();
    match (secs / 60, secs % 60) {
        (1, 0) => "1 minute".to_string(),
        (minutes, 0) if minutes > 0 => format!("{minutes} minutes"),
        _ => format!("{secs} seconds"),
    }
}

/// Render the account activation mail carrying the one-time code
pub fn activation_message(username: &str, email: &str, code: &str, ttl: Duration) -> MailMessage {
    let expires = describe_ttl(ttl);
    let body = format!(
        "Hello {username},\n\n\
         Thank you for registering. To activate your account, enter the code below \
         on the activation page:\n\n\
         {code}\n\n\
         The code expires in {expires}. If you did not sign up, ignore this email.\n"
    );

    MailMessage {
        to: email.to_string(),
        subject: "Activate your account".to_string(),
        body,
    }
}
