//! Signup confirmations.
//!
//! A [`Notifier`] is handed the volunteer and the event after the enrollment
//! has been recorded. Delivery failure is reported to the caller but never
//! rolls the enrollment back.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::time::timeout;

use crate::config::{CaresConfig, SmtpConfig};
use crate::error::{CaresError, CaresResult};
use crate::event::Event;

const SUBJECT_PREFIX: &str = "You're signed up:";

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, name: &str, email: &str, event: &Event) -> CaresResult<()>;
}

/// Plain-text confirmation body.
pub fn confirmation_body(name: &str, event: &Event) -> String {
    format!(
        "Hi {name},\n\n\
        Thank you for signing up to volunteer!\n\n\
        Event: {}\n\
        Organization: {}\n\
        Date: {}\n\n\
        See you there.\n",
        event.title,
        event.organization,
        event.date.format("%Y-%m-%d"),
    )
}

/// Pick the notifier for this configuration: SMTP when a relay is
/// configured, otherwise log-only.
pub fn from_config(config: &CaresConfig) -> CaresResult<Arc<dyn Notifier>> {
    match &config.smtp {
        Some(smtp) => Ok(Arc::new(SmtpNotifier::new(smtp)?)),
        None => Ok(Arc::new(LogNotifier)),
    }
}

/// Run `notifier`, giving up after `limit`.
pub async fn notify_with_timeout(
    notifier: &dyn Notifier,
    limit: Duration,
    name: &str,
    email: &str,
    event: &Event,
) -> CaresResult<()> {
    timeout(limit, notifier.notify(name, email, event))
        .await
        .map_err(|_| CaresError::NotificationTimeout(limit.as_secs()))?
}

/// Sends confirmations through an authenticated SMTP relay.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> CaresResult<Self> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| CaresError::Config(format!("SMTP relay error: {e}")))?
            .port(config.port)
            .credentials(credentials)
            .build();

        let from_header = match &config.from_name {
            Some(name) => format!("{name} <{}>", config.from_email),
            None => config.from_email.clone(),
        };
        let from: Mailbox = from_header
            .parse()
            .map_err(|e| CaresError::Config(format!("Invalid from address: {e}")))?;

        Ok(SmtpNotifier { mailer, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, name: &str, email: &str, event: &Event) -> CaresResult<()> {
        let to: Mailbox = email
            .parse()
            .map_err(|e| CaresError::Notification(format!("Invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(format!("{SUBJECT_PREFIX} {}", event.title))
            .header(ContentType::TEXT_PLAIN)
            .body(confirmation_body(name, event))
            .map_err(|e| CaresError::Notification(format!("Failed to build email: {e}")))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| CaresError::Notification(format!("Failed to send email: {e}")))?;

        tracing::info!(event_id = event.id, "sent signup confirmation");
        Ok(())
    }
}

/// Used when no mail relay is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, name: &str, email: &str, event: &Event) -> CaresResult<()> {
        tracing::info!(
            event_id = event.id,
            %email,
            "no mail relay configured, confirmation not sent:\n{}",
            confirmation_body(name, event)
        );
        Ok(())
    }
}
