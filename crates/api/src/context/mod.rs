//! Client context - dependency injection container
//!
//! Builds every resilience component once, wires them together and owns
//! their background tasks. Hosts construct a single [`ClientContext`] and
//! pass it (or the pieces they need) to the rest of the application.

use std::path::PathBuf;
use std::sync::Arc;

use edubrain_common::{SharedClock, SystemClock};
use edubrain_core::{
    ClientEnvironment, CredentialLifecycle, ErrorCallback, ErrorHandler, HealthStatusListener,
    KeyValueStore, LogFacade, Navigator, Notifier, PageEvent, PageEvents,
};
use edubrain_domain::{ClientConfig, ClientError, Result};
use edubrain_infra::{
    ApiClient, ApiComponentProbe, ComponentHealthChecker, ConsoleMirror,
    CredentialRefreshScheduler, ExpiringStore, FileStore, HeadlessNavigator, HealthMonitor,
    HttpLogTransport, HttpProbe, LogBatcher, MemoryStore, StaticEnvironment, TracingNotifier,
};
use tracing::{info, warn};

use crate::utils::health::ClientHealth;

/// Host-provided collaborators.
///
/// The defaults run headless: notifications and redirects are logged, the
/// credential lives in memory and time comes from the system clock.
pub struct HostAdapters {
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub environment: Arc<dyn ClientEnvironment>,
    /// Persist the credential in a JSON file instead of memory.
    pub credential_file: Option<PathBuf>,
    pub health_listener: Option<Arc<dyn HealthStatusListener>>,
    pub on_error: Option<ErrorCallback>,
    pub clock: SharedClock,
    /// Starting connectivity reported by the page event hub.
    pub online: bool,
}

impl Default for HostAdapters {
    fn default() -> Self {
        Self {
            notifier: Arc::new(TracingNotifier),
            navigator: Arc::new(HeadlessNavigator::default()),
            environment: Arc::new(StaticEnvironment::default()),
            credential_file: None,
            health_listener: None,
            on_error: None,
            clock: Arc::new(SystemClock),
            online: true,
        }
    }
}

/// Client context - holds all services and dependencies
pub struct ClientContext {
    pub config: ClientConfig,
    pub events: PageEvents,
    pub credentials: Arc<CredentialLifecycle>,
    pub api: Arc<ApiClient>,
    pub logger: Arc<LogBatcher>,
    pub error_handler: Arc<ErrorHandler>,
    pub health: Arc<HealthMonitor>,
    pub components: Arc<ComponentHealthChecker>,
    pub credential_refresh: Arc<CredentialRefreshScheduler>,
    pub navigator: Arc<dyn Navigator>,
}

impl ClientContext {
    /// Build a context from the layered configuration (file, then
    /// environment) with headless host adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if configuration cannot be loaded or
    /// an HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let config = edubrain_infra::config::load()?;
        Self::new_with_config(config)
    }

    /// Build a context for `config` with headless host adapters.
    ///
    /// # Errors
    ///
    /// See [`ClientContext::with_host`].
    pub fn new_with_config(config: ClientConfig) -> Result<Self> {
        Self::with_host(config, HostAdapters::default())
    }

    /// Build a context for `config` using the host's collaborators.
    ///
    /// Nothing is started; call [`ClientContext::start`] once the host is
    /// ready to receive notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation, the credential file
    /// cannot be opened, or an HTTP client cannot be built.
    pub fn with_host(config: ClientConfig, host: HostAdapters) -> Result<Self> {
        config.validate()?;

        let events = PageEvents::with_online(host.online);

        let primary: Arc<dyn KeyValueStore> = match &host.credential_file {
            Some(path) => Arc::new(FileStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        let credentials = Arc::new(
            CredentialLifecycle::new(primary, host.clock.clone(), config.credentials.clone())
                .with_secondary(Arc::new(ExpiringStore::new(host.clock.clone()))),
        );

        let api = Arc::new(ApiClient::new(&config.api, credentials.clone())?);

        let logger = Arc::new(LogBatcher::new(
            Arc::new(HttpLogTransport::new(api.clone(), config.logging.endpoint.clone())),
            host.environment,
            &config.logging,
            host.clock.clone(),
        ));
        let mirrored: Arc<dyn LogFacade> = Arc::new(ConsoleMirror::new(logger.clone()));

        let mut handler = ErrorHandler::new(config.errors.clone())
            .with_logger(mirrored)
            .with_notifier(host.notifier)
            .with_navigator(host.navigator.clone())
            .with_credentials(credentials.clone());
        if let Some(callback) = host.on_error {
            handler = handler.with_callback(callback);
        }
        let error_handler = Arc::new(handler);
        api.attach_error_handler(&error_handler);

        let probe = Arc::new(HttpProbe::new(&config.health)?);
        let mut health =
            HealthMonitor::new(probe, events.clone(), &config.health, host.clock.clone());
        if let Some(listener) = host.health_listener {
            health = health.with_listener(listener);
        }

        let components = Arc::new(ComponentHealthChecker::new(
            Arc::new(ApiComponentProbe::new(api.clone(), &config.health)),
            &config.health,
            host.clock,
        ));

        let credential_refresh = Arc::new(CredentialRefreshScheduler::new(credentials.clone()));

        info!(api = %api.base_url(), "client context created");

        Ok(Self {
            config,
            events,
            credentials,
            api,
            logger,
            error_handler,
            health: Arc::new(health),
            components,
            credential_refresh,
            navigator: host.navigator,
        })
    }

    /// Start the health monitor, the log batcher and the refresh scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Lifecycle`] if any component is already running.
    /// Components started before the failure keep running until
    /// [`ClientContext::shutdown`].
    pub fn start(&self) -> Result<()> {
        self.health.start()?;
        self.logger.start(&self.events)?;
        self.credential_refresh.start(&self.events)?;
        info!(
            health_interval_ms = self.config.health.interval_ms,
            flush_interval_ms = self.config.logging.flush_interval_ms,
            "client context started"
        );
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.health.is_running() || self.logger.is_running() || self.credential_refresh.is_running()
    }

    /// Forward a host lifecycle event (connectivity, visibility, unload).
    pub fn emit(&self, event: PageEvent) {
        self.events.emit(event);
    }

    /// Snapshot of reachability, component health and background tasks.
    pub async fn health_check(&self) -> ClientHealth {
        let components = self.components.check_all().await;
        ClientHealth::collect(self, components)
    }

    /// Flush pending logs, then stop every background task.
    ///
    /// Records the flush could not deliver are handed to the fire-and-forget
    /// transport before the logger stops. Every component is stopped even
    /// when an earlier one fails; the first error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Lifecycle`] if a task does not stop within its
    /// grace period.
    pub async fn shutdown(&self) -> Result<()> {
        info!(pending_logs = self.logger.len(), "shutdown called on ClientContext");

        self.logger.flush().await;
        if self.logger.teardown() {
            warn!("log flush failed during shutdown, remaining records sent as beacon");
        }

        let results = [
            self.credential_refresh.stop().await,
            self.health.stop().await,
            self.logger.stop().await,
        ];

        let mut first_error: Option<ClientError> = None;
        for result in results {
            if let Err(err) = result {
                warn!(error = %err, "component failed to stop cleanly");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                info!("client context stopped");
                Ok(())
            }
        }
    }
}
