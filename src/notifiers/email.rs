use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::SmtpConfig;
use crate::notifiers::{format_body, format_subject, NotificationEvent, Notifier};
use crate::utils::error::AppError;

pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: SmtpConfig,
}

impl EmailNotifier {
    pub fn new(config: SmtpConfig) -> Result<Self, AppError> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| AppError::Notification(format!("smtp relay setup failed: {e}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        builder = builder.port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            config,
        })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<(), AppError> {
        let from_address = self
            .config
            .from_address
            .as_deref()
            .ok_or_else(|| AppError::Notification("smtp from_address not configured".into()))?;

        let message = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, from_address)
                    .parse()
                    .map_err(|e| AppError::Notification(format!("invalid from address: {e}")))?,
            )
            .to(self
                .config
                .to_address
                .parse()
                .map_err(|e| AppError::Notification(format!("invalid to address: {e}")))?)
            .subject(format_subject(event))
            .header(ContentType::TEXT_PLAIN)
            .body(format_body(event))
            .map_err(|e| AppError::Notification(format!("failed to build email: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Notification(format!("smtp send failed: {e}")))?;

        info!(item_id = %event.item_id, to = %self.config.to_address, "price drop email sent");
        Ok(())
    }
}
