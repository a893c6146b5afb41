//! Domain types and models

pub mod api;
pub mod credential;
pub mod error_info;
pub mod failure;
pub mod health;
pub mod log;
pub mod notification;

pub use api::{ApiResponse, RequestOptions};
pub use credential::Credential;
pub use error_info::{ErrorInfo, ErrorKind, Severity};
pub use failure::{FailureCause, RequestFailure};
pub use health::{ComponentCheck, ComponentReport, HealthStatus};
pub use log::{LogBatch, LogContext, LogLevel, LogRecord};
pub use notification::{Notification, NotificationChannel, NotificationTone};
