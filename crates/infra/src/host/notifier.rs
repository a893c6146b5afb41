use edubrain_core::Notifier;
use edubrain_domain::{Notification, NotificationChannel, NotificationTone};
use tracing::{info, warn};

/// Notifier that writes every notification to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let channel = match notification.channel {
            NotificationChannel::Persistent => "persistent",
            NotificationChannel::Toast => "toast",
        };
        let title = notification.title.as_deref().unwrap_or_default();
        let duration_ms = u64::try_from(notification.duration.as_millis()).unwrap_or(u64::MAX);

        match notification.tone {
            NotificationTone::Warning | NotificationTone::Error => warn!(
                channel,
                title,
                duration_ms,
                tone = ?notification.tone,
                "{}",
                notification.message
            ),
            NotificationTone::Success | NotificationTone::Info => info!(
                channel,
                title,
                duration_ms,
                tone = ?notification.tone,
                "{}",
                notification.message
            ),
        }
    }
}
