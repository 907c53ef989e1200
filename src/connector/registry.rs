use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::config::ExecutorConfig;
use crate::transport::Transport;

use super::Connector;

/// Tag-keyed store of connectors, created lazily on first lookup.
///
/// Every connector shares the registry's transport and executor settings.
pub struct ConnectorRegistry {
    connectors: Mutex<HashMap<String, Connector>>,
    transport: Arc<dyn Transport>,
    config: ExecutorConfig,
    created: AtomicU64,
}

impl ConnectorRegistry {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: ExecutorConfig) -> Self {
        Self {
            connectors: Mutex::new(HashMap::new()),
            transport,
            config,
            created: AtomicU64::new(0),
        }
    }

    fn lock_connectors(&self) -> MutexGuard<'_, HashMap<String, Connector>> {
        self.connectors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the connector for `tag`, creating it on first use.
    ///
    /// Concurrent callers for an unseen tag all observe the same connector.
    pub fn get_or_create(&self, tag: &str) -> Connector {
        let mut connectors = self.lock_connectors();
        if let Some(connector) = connectors.get(tag) {
            return connector.clone();
        }

        let connector = Connector::new(self.config.clone(), Arc::clone(&self.transport));
        connectors.insert(tag.to_owned(), connector.clone());
        self.created.fetch_add(1, Ordering::Relaxed);
        info!(tag, "Created connector");
        connector
    }

    /// Stops and forgets the connector for `tag`. No-op when absent.
    pub fn evict(&self, tag: &str) {
        let removed = self.lock_connectors().remove(tag);
        if let Some(connector) = removed {
            connector.executor().stop();
            info!(tag, "Evicted connector");
        }
    }

    /// Stops every connector and clears the registry.
    ///
    /// A lookup racing this sweep may register a fresh connector afterwards.
    pub fn evict_all(&self) {
        let drained: Vec<(String, Connector)> = self.lock_connectors().drain().collect();
        for (tag, connector) in &drained {
            connector.executor().stop();
            tracing::debug!(tag = tag.as_str(), "Evicted connector");
        }
        if !drained.is_empty() {
            info!("Evicted {} connector(s)", drained.len());
        }
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.lock_connectors().contains_key(tag)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_connectors().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_connectors().is_empty()
    }

    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.lock_connectors().keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Total connectors constructed over the registry's lifetime.
    #[must_use]
    pub fn connectors_created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("tags", &self.tags())
            .field("created", &self.connectors_created())
            .finish_non_exhaustive()
    }
}
