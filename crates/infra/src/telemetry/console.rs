//! Mirror of diagnostic records into `tracing`

use std::sync::Arc;

use edubrain_core::LogFacade;
use edubrain_domain::{LogContext, LogLevel};
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Writes every record to `tracing`, then forwards it to `inner`.
pub struct ConsoleMirror {
    inner: Arc<dyn LogFacade>,
}

impl ConsoleMirror {
    pub fn new(inner: Arc<dyn LogFacade>) -> Self {
        Self { inner }
    }
}

impl LogFacade for ConsoleMirror {
    fn log(&self, level: LogLevel, message: &str, context: LogContext) {
        let fields = Value::Object(context.clone());
        match level {
            LogLevel::Debug => debug!(context = %fields, "{message}"),
            LogLevel::Info => info!(context = %fields, "{message}"),
            LogLevel::Warn => warn!(context = %fields, "{message}"),
            LogLevel::Error => error!(context = %fields, "{message}"),
        }
        self.inner.log(level, message, context);
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct Collect(Mutex<Vec<(LogLevel, String)>>);

    impl LogFacade for Collect {
        fn log(&self, level: LogLevel, message: &str, _context: LogContext) {
            self.0.lock().push((level, message.to_string()));
        }
    }

    #[test]
    fn forwards_every_record() {
        let inner = Arc::new(Collect::default());
        let mirror = ConsoleMirror::new(inner.clone());

        mirror.warn("slow", LogContext::new());
        mirror.error("broken", LogContext::new());

        assert_eq!(
            *inner.0.lock(),
            vec![(LogLevel::Warn, "slow".to_string()), (LogLevel::Error, "broken".to_string())]
        );
    }
}
