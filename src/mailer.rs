use anyhow::{Context, Result};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use tracing::{error, info};

use crate::config::MailConfig;

const SUBJECT: &str = "Institute Registration Received";

/// Best-effort outbound notifier. Delivery runs on a detached task; the
/// request path never waits on it and failures are only visible in the log.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl Mailer {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .context("invalid SMTP host")?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
        })
    }

    /// Queues a registration notification without blocking the caller.
    pub fn send_registration_notice(&self, name: &str, to: &str) {
        let mailer = self.clone();
        let name = name.to_string();
        let to = to.to_string();

        tokio::spawn(async move {
            match mailer.deliver(&name, &to).await {
                Ok(()) => info!(%to, "registration notification sent"),
                Err(err) => error!(?err, %to, "registration notification failed"),
            }
        });
    }

    async fn deliver(&self, name: &str, to: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.parse().context("invalid sender address")?)
            .to(to.parse().context("invalid recipient address")?)
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(registration_body(name))?;

        self.transport.send(message).await?;
        Ok(())
    }
}

fn registration_body(name: &str) -> String {
    format!("Hello {name}, your registration has been received.")
}
