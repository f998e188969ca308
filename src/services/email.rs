// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::services::logging::anonymize_email;
use anyhow::{Context, Result};
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use std::env;
use std::sync::{Arc, Mutex};

/// SMTP settings. Absent when mail should stay in the in-process outbox.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub tls: bool,
}

/// Configuration for the email service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp: Option<SmtpConfig>,
    pub from_email: String,
    pub from_name: String,
    /// Lifetime of verification and reset codes, quoted in the emails
    pub code_expiry_hours: u64,
}

impl EmailConfig {
    /// Load email configuration from environment variables.
    /// Without `SMTP_HOST` the service falls back to the outbox.
    pub fn from_env() -> Result<Self> {
        let smtp = match env::var("SMTP_HOST") {
            Ok(host) if !host.is_empty() => Some(SmtpConfig {
                host,
                port: env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse()
                    .context("SMTP_PORT must be a valid port number")?,
                username: env::var("SMTP_USERNAME").context("SMTP_USERNAME must be set")?,
                password: env::var("SMTP_PASSWORD").context("SMTP_PASSWORD must be set")?,
                tls: env::var("SMTP_TLS").map(|v| v == "true").unwrap_or(true),
            }),
            _ => None,
        };

        Ok(Self {
            smtp,
            from_email: env::var("SMTP_FROM_EMAIL")
                .unwrap_or_else(|_| "no-reply@teleprompter.local".to_string()),
            from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Teleprompter".to_string()),
            code_expiry_hours: env::var("VERIFICATION_CODE_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .context("VERIFICATION_CODE_EXPIRY_HOURS must be a valid number")?,
        })
    }

    /// Outbox-only configuration used by tests and local development.
    pub fn outbox() -> Self {
        Self {
            smtp: None,
            from_email: "no-reply@teleprompter.local".to_string(),
            from_name: "Teleprompter".to_string(),
            code_expiry_hours: 24,
        }
    }
}

/// Email template with simple variable substitution.
struct EmailTemplate {
    content: &'static str,
}

impl EmailTemplate {
    const fn new(content: &'static str) -> Self {
        Self { content }
    }

    fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut result = self.content.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

// Email templates loaded at compile time
const VERIFICATION_TEMPLATE: EmailTemplate =
    EmailTemplate::new(include_str!("../../templates/emails/verification.txt"));
const PASSWORD_RESET_TEMPLATE: EmailTemplate =
    EmailTemplate::new(include_str!("../../templates/emails/password_reset.txt"));

/// A message captured by the outbox transport.
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone)]
enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Outbox(Arc<Mutex<Vec<SentEmail>>>),
}

/// Email service for account verification and password reset codes.
#[derive(Clone)]
pub struct EmailService {
    transport: Transport,
    from_mailbox: Mailbox,
    config: EmailConfig,
}

impl EmailService {
    /// Create a new email service with the given configuration.
    pub fn new(config: EmailConfig) -> Result<Self> {
        let transport = match &config.smtp {
            Some(smtp) => {
                let creds = Credentials::new(smtp.username.clone(), smtp.password.clone());
                let transport = if smtp.tls {
                    AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
                        .context("Failed to create SMTP relay")?
                        .port(smtp.port)
                        .credentials(creds)
                        .build()
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
                        .port(smtp.port)
                        .credentials(creds)
                        .build()
                };
                Transport::Smtp(transport)
            }
            None => {
                tracing::info!("SMTP_HOST not set, emails are kept in the in-process outbox");
                Transport::Outbox(Arc::new(Mutex::new(Vec::new())))
            }
        };

        let from_mailbox: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .context("Invalid from email address")?;

        Ok(Self {
            transport,
            from_mailbox,
            config,
        })
    }

    /// Send the account verification code.
    pub async fn send_verification_code(
        &self,
        to_email: &str,
        username: &str,
        code: &str,
    ) -> Result<()> {
        let expiry_hours = self.config.code_expiry_hours.to_string();

        let body = VERIFICATION_TEMPLATE.render(&[
            ("username", username),
            ("code", code),
            ("expiry_hours", &expiry_hours),
        ]);

        self.send_email(to_email, "Verify your Teleprompter account", &body)
            .await
    }

    /// Send a password reset code.
    pub async fn send_password_reset_code(
        &self,
        to_email: &str,
        username: &str,
        code: &str,
    ) -> Result<()> {
        let expiry_hours = self.config.code_expiry_hours.to_string();

        let body = PASSWORD_RESET_TEMPLATE.render(&[
            ("username", username),
            ("code", code),
            ("expiry_hours", &expiry_hours),
        ]);

        self.send_email(to_email, "Reset your Teleprompter password", &body)
            .await
    }

    /// Messages captured so far. Empty when sending over SMTP.
    pub fn outbox(&self) -> Vec<SentEmail> {
        match &self.transport {
            Transport::Outbox(sent) => sent.lock().map(|s| s.clone()).unwrap_or_default(),
            Transport::Smtp(_) => Vec::new(),
        }
    }

    /// Send an email.
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let to_mailbox: Mailbox = to.parse().context("Invalid recipient email address")?;

        let email = Message::builder()
            .from(self.from_mailbox.clone())
            .to(to_mailbox)
            .subject(subject)
            .body(body.to_string())
            .context("Failed to build email message")?;

        match &self.transport {
            Transport::Smtp(transport) => {
                transport
                    .send(email)
                    .await
                    .context("Failed to send email")?;
            }
            Transport::Outbox(sent) => {
                tracing::debug!(to = %anonymize_email(to), subject, "email stored in outbox");
                sent.lock()
                    .map_err(|_| anyhow::anyhow!("Outbox lock poisoned"))?
                    .push(SentEmail {
                        to: to.to_string(),
                        subject: subject.to_string(),
                        body: body.to_string(),
                    });
            }
        }

        Ok(())
    }
}
