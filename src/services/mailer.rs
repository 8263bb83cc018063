use crate::error::{AppError, Result};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// SMTP delivery settings, read from the environment. Mail is an optional
/// sink: when the variables are absent the report is still written and
/// printed.
pub struct MailConfig {
    pub address: String,
    pub password: String,
    pub to: String,
    pub smtp_host: String,
}

impl MailConfig {
    /// Build from `MAIL_ADDRESS` / `MAIL_PASSWORD` (plus optional `MAIL_TO`
    /// and `SMTP_HOST`); returns None when mailing is not configured.
    pub fn from_env() -> Option<Self> {
        let address = std::env::var("MAIL_ADDRESS").ok()?;
        let password = std::env::var("MAIL_PASSWORD").ok()?;
        if address.is_empty() || password.is_empty() {
            return None;
        }

        let to = std::env::var("MAIL_TO").unwrap_or_else(|_| address.clone());
        let smtp_host =
            std::env::var("SMTP_HOST").unwrap_or_else(|_| DEFAULT_SMTP_HOST.to_string());

        Some(Self {
            address,
            password,
            to,
            smtp_host,
        })
    }
}

/// Send the report body over implicit-TLS SMTP. Failures are reported to
/// the caller, which logs and moves on; delivery never gates the scan.
pub fn send_report(config: &MailConfig, subject: &str, body: &str) -> Result<()> {
    let message = Message::builder()
        .from(
            config
                .address
                .parse()
                .map_err(|e| AppError::Mail(format!("Bad sender address: {}", e)))?,
        )
        .to(config
            .to
            .parse()
            .map_err(|e| AppError::Mail(format!("Bad recipient address: {}", e)))?)
        .subject(subject)
        .body(body.to_string())
        .map_err(|e| AppError::Mail(format!("Failed to build message: {}", e)))?;

    let transport = SmtpTransport::relay(&config.smtp_host)
        .map_err(|e| AppError::Mail(format!("Bad SMTP host: {}", e)))?
        .credentials(Credentials::new(
            config.address.clone(),
            config.password.clone(),
        ))
        .build();

    transport
        .send(&message)
        .map_err(|e| AppError::Mail(format!("Send failed: {}", e)))?;

    Ok(())
}
