//! Operator notifications for fatal bridge failures.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::NotifyConfig;
use crate::error::{BridgeError, Result};

/// Sends a single alert message.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Notifier that delivers through an SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    /// Build a plain (non-TLS) relay transport from the configuration.
    pub fn new(config: &NotifyConfig) -> Self {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Self {
            transport: builder.build(),
        }
    }
}

impl Notifier for SmtpNotifier {
    async fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> Result<()> {
        let from: Mailbox = from.parse().map_err(BridgeError::notification)?;
        let to: Mailbox = to.parse().map_err(BridgeError::notification)?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(BridgeError::notification)?;

        self.transport
            .send(email)
            .await
            .map_err(BridgeError::notification)?;

        Ok(())
    }
}

/// Build the subject and body of a failure alert.
pub fn compose_failure(
    config: &NotifyConfig,
    bridge: &str,
    context: &str,
    error: &str,
) -> (String, String) {
    let subject = format!("{} {} bridge failure: {}", config.subject_prefix, bridge, context);
    let body = format!(
        "The {} bridge stopped.\n\n{}\n\nError: {}\n\nTime: {}\n",
        bridge,
        context,
        error,
        chrono::Utc::now().to_rfc3339()
    );
    (subject, body)
}

/// Alert every configured recipient about a failure.
///
/// Best effort: delivery errors are logged and never returned. Returns the
/// number of messages that were attempted.
pub async fn notify_failure<N: Notifier>(
    notifier: &N,
    config: &NotifyConfig,
    bridge: &str,
    context: &str,
    error: &str,
) -> usize {
    let (true, Some(from)) = (config.is_enabled(), config.sender()) else {
        tracing::debug!("No notification recipients configured");
        return 0;
    };

    let (subject, body) = compose_failure(config, bridge, context, error);
    let mut attempted = 0;

    for to in config.destinations() {
        attempted += 1;
        match notifier.send(from, to, &subject, &body).await {
            Ok(()) => tracing::info!(to = %to, "Failure notification sent"),
            Err(e) => tracing::warn!(to = %to, error = %e, "Failed to send failure notification"),
        }
    }

    attempted
}
