use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::notify::{LogNotifier, Notifier};
use crate::store::{InMemoryReportStore, ReportStore};
use lostfound::LostFoundConfig;
use matcher::Matcher;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Matcher instance (shared across requests)
    pub matcher: Arc<Matcher>,

    /// Lost and found reports
    pub store: Arc<dyn ReportStore>,

    /// Delivery channel for match notifications
    pub notifier: Arc<dyn Notifier>,

    /// Prometheus renderer, present once the recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state with an in-memory store and a log notifier.
    ///
    /// The matcher is built from `engine_config_path` when set, otherwise
    /// from built-in defaults.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let engine = match &config.engine_config_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading engine config");
                LostFoundConfig::from_file(path)?
            }
            None => LostFoundConfig::default(),
        };
        let matcher = Arc::new(engine.build_matcher()?);

        Ok(Self {
            config: Arc::new(config),
            matcher,
            store: Arc::new(InMemoryReportStore::new()),
            notifier: Arc::new(LogNotifier::new()),
            metrics_handle: None,
        })
    }

    pub fn with_store(mut self, store: Arc<dyn ReportStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_metrics_handle(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}
