use crate::{error::MailError, types::Booking};
use async_trait::async_trait;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    pub fn booking_confirmation(booking: &Booking) -> Self {
        Self {
            to: booking.user_email.clone(),
            subject: "Slot Booking Confirmation".into(),
            body: format!(
                "Your booking with {} on {} at {} has been confirmed. Thank you!",
                booking.person_name,
                booking.date.format("%Y-%m-%d"),
                booking.time_slot
            ),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

/// Sends the email on its own task. The outcome is only logged.
pub fn send_in_background(mailer: Arc<dyn Mailer>, email: Email) {
    tokio::spawn(async move {
        let to = email.to.clone();
        match mailer.send(email).await {
            Ok(()) => info!(to = %to, "Confirmation email sent"),
            Err(err) => error!(%err, to = %to, "Confirmation email failed"),
        }
    });
}

/// Used when no sender address is configured.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, body = %email.body, "Email delivery disabled, logging instead");
        Ok(())
    }
}

pub struct SesMailer {
    client: SesClient,
    from: String,
}

impl SesMailer {
    pub async fn new(from: String) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: SesClient::new(&aws_config),
            from,
        }
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        let subject = Content::builder()
            .data(email.subject)
            .build()
            .map_err(|err| MailError::Build(err.to_string()))?;
        let text = Content::builder()
            .data(email.body)
            .build()
            .map_err(|err| MailError::Build(err.to_string()))?;
        let message = Message::builder()
            .subject(subject)
            .body(Body::builder().text(text).build())
            .build();

        self.client
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(email.to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|err| MailError::Send(err.to_string()))?;
        Ok(())
    }
}
