//! User-facing notifications

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationTone {
    Success,
    Info,
    Warning,
    Error,
}

/// Where a notification is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    /// Titled panel that stays up for the full duration.
    Persistent,
    /// Short transient message.
    Toast,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: Option<String>,
    pub message: String,
    pub tone: NotificationTone,
    pub duration: Duration,
    pub channel: NotificationChannel,
}

impl Notification {
    pub fn persistent(
        title: impl Into<String>,
        message: impl Into<String>,
        tone: NotificationTone,
        duration: Duration,
    ) -> Self {
        Self {
            title: Some(title.into()),
            message: message.into(),
            tone,
            duration,
            channel: NotificationChannel::Persistent,
        }
    }

    pub fn toast(message: impl Into<String>, tone: NotificationTone, duration: Duration) -> Self {
        Self {
            title: None,
            message: message.into(),
            tone,
            duration,
            channel: NotificationChannel::Toast,
        }
    }
}
