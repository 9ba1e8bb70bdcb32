//! Email, SMS and push notification endpoints.
//!
//! Nothing is delivered. Requests are validated, formatted, logged, and
//! then succeed or fail at a fixed per-channel rate.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::health::Severity;

/// Longest SMS body kept before truncation, prefix excluded.
pub const SMS_MAX_LEN: usize = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Sms,
    Push,
}

impl Channel {
    pub fn success_rate(self) -> f64 {
        match self {
            Channel::Email => 0.9,
            Channel::Sms => 0.95,
            Channel::Push => 1.0,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Email => write!(f, "Email"),
            Channel::Sms => write!(f, "SMS"),
            Channel::Push => write!(f, "Push"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid phone number format")]
    InvalidPhone,

    #[error("Failed to send {0} notification")]
    DeliveryFailed(Channel),
}

impl From<NotifyError> for ApiError {
    fn from(err: NotifyError) -> Self {
        match err {
            NotifyError::DeliveryFailed(_) => ApiError::Internal(err.to_string()),
            _ => ApiError::Validation(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmsRequest {
    pub to: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    pub user_id: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A present, non-blank field.
fn required(field: &Option<String>) -> Result<&str, NotifyError> {
    field
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(NotifyError::MissingFields)
}

/// Optional leading `+`, then one or more digits, spaces, `-`, `(` or `)`.
pub fn is_valid_phone(number: &str) -> bool {
    let body = number.strip_prefix('+').unwrap_or(number);
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '(' | ')'))
}

fn sms_prefix(severity: Severity) -> &'static str {
    match severity {
        Severity::Emergency => "EMERGENCY",
        Severity::Danger => "ALERT",
        Severity::Warning => "WARNING",
        Severity::Info => "INFO",
    }
}

/// Severity prefix plus the message cut to [`SMS_MAX_LEN`] characters.
pub fn format_sms(message: &str, severity: Severity) -> String {
    let body = if message.chars().count() > SMS_MAX_LEN {
        let kept: String = message.chars().take(SMS_MAX_LEN - 3).collect();
        format!("{kept}...")
    } else {
        message.to_string()
    };
    format!("{}: {body}", sms_prefix(severity))
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "#3b82f6",
        Severity::Warning => "#f59e0b",
        Severity::Danger => "#ef4444",
        Severity::Emergency => "#dc2626",
    }
}

/// Escapes text for an HTML element body.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the alert email. `subject` and `message` are escaped.
pub fn email_html(subject: &str, message: &str, severity: Severity) -> String {
    let color = severity_color(severity);
    let subject = escape_html(subject);
    let message = escape_html(message);
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{subject}</title>
  </head>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: {color}; color: white; padding: 20px; border-radius: 8px 8px 0 0;">
      <h1 style="margin: 0; font-size: 24px;">{subject}</h1>
    </div>
    <div style="background: #f9f9f9; padding: 20px; border-radius: 0 0 8px 8px; border: 1px solid #ddd;">
      <p style="font-size: 16px; margin-bottom: 20px;">{message}</p>
      <div style="background: white; padding: 15px; border-radius: 4px; border-left: 4px solid {color};">
        <p style="margin: 0; font-weight: bold;">Air Quality Monitor</p>
        <p style="margin: 5px 0 0 0; font-size: 14px; color: #666;">
          Stay informed about air quality conditions in your area.
        </p>
      </div>
      <p style="font-size: 12px; color: #888; margin-top: 20px;">
        You received this notification because you subscribed to air quality alerts.
      </p>
    </div>
  </body>
</html>
"#
    )
}

fn deliver<R: Rng + ?Sized>(
    rng: &mut R,
    channel: Channel,
    now: DateTime<Utc>,
) -> Result<Receipt, NotifyError> {
    if rng.gen_bool(channel.success_rate()) {
        Ok(Receipt {
            success: true,
            message: format!("{channel} notification sent successfully"),
            timestamp: now,
        })
    } else {
        warn!(%channel, "Notification delivery failed");
        Err(NotifyError::DeliveryFailed(channel))
    }
}

pub fn send_email<R: Rng + ?Sized>(
    rng: &mut R,
    req: &EmailRequest,
    now: DateTime<Utc>,
) -> Result<Receipt, NotifyError> {
    let to = required(&req.to)?;
    let subject = required(&req.subject)?;
    let message = required(&req.message)?;

    let html = email_html(subject, message, req.severity);
    info!(
        to,
        subject,
        severity = ?req.severity,
        html_bytes = html.len(),
        "Sending email notification"
    );
    deliver(rng, Channel::Email, now)
}

pub fn send_sms<R: Rng + ?Sized>(
    rng: &mut R,
    req: &SmsRequest,
    now: DateTime<Utc>,
) -> Result<Receipt, NotifyError> {
    let to = required(&req.to)?;
    let message = required(&req.message)?;
    if !is_valid_phone(to) {
        return Err(NotifyError::InvalidPhone);
    }

    let text = format_sms(message, req.severity);
    info!(to, text = %text, "Sending SMS notification");
    deliver(rng, Channel::Sms, now)
}

pub fn send_push<R: Rng + ?Sized>(
    rng: &mut R,
    req: &PushRequest,
    now: DateTime<Utc>,
) -> Result<Receipt, NotifyError> {
    let title = required(&req.title)?;
    let message = required(&req.message)?;

    info!(
        title,
        message,
        severity = ?req.severity,
        user_id = req.user_id.as_deref(),
        tag = req.tag.as_deref(),
        "Sending push notification"
    );
    deliver(rng, Channel::Push, now)
}
