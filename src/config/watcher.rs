//! Configuration file watcher for hot reload.
//!
//! Watches the service config and, when one is configured, the route table
//! file. A change to either reloads the service config and sends it on; the
//! server rebuilds a fresh route map from it and swaps it in. A built map is
//! never edited.
//!
//! # Data Flow
//! ```text
//! notify callback (watcher thread)
//!     → mpsc → reload task (owns the watcher)
//!     → load_config
//!     → re-point the routes file watch if `api.routes_file` moved
//!     → mpsc → server reload loop
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::loader::load_config;
use crate::config::schema::ServiceConfig;

/// Watches the config file (and route table file) for changes.
pub struct ConfigWatcher {
    config_path: PathBuf,
    routes_path: Option<PathBuf>,
    poll_interval: Duration,
    update_tx: mpsc::UnboundedSender<ServiceConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for reloaded configurations.
    pub fn new(
        config_path: &Path,
        config: &ServiceConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ServiceConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                config_path: config_path.to_path_buf(),
                routes_path: config.api.routes_file.clone(),
                poll_interval: Duration::from_secs(config.reload.poll_interval_secs),
                update_tx,
            },
            update_rx,
        )
    }

    /// Paths being watched, config first.
    pub fn paths(&self) -> Vec<&Path> {
        std::iter::once(self.config_path.as_path())
            .chain(self.routes_path.as_deref())
            .collect()
    }

    /// Start watching. Must be called inside a tokio runtime.
    ///
    /// The returned task owns the file watcher and runs until the runtime stops.
    pub fn run(mut self) -> Result<JoinHandle<()>, notify::Error> {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        // Watch calls from inside the callback would block the watcher thread,
        // so events are handed to the task below.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = event_tx.send(res);
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        for path in self.paths() {
            watcher.watch(path, RecursiveMode::NonRecursive)?;
        }
        tracing::info!(paths = ?self.paths(), "Config watcher started");

        Ok(tokio::spawn(async move {
            while let Some(res) = event_rx.recv().await {
                match res {
                    Ok(event) if is_content_change(&event.kind) => {
                        tracing::info!(paths = ?event.paths, "Route source changed, reloading");
                        self.reload(&mut watcher);
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!(error = ?e, "Watch error"),
                }
            }
        }))
    }

    fn reload<W: Watcher>(&mut self, watcher: &mut W) {
        match load_config(&self.config_path) {
            Ok(config) => {
                self.follow_routes_file(watcher, config.api.routes_file.clone());
                let _ = self.update_tx.send(config);
            }
            Err(e) => tracing::error!(
                path = %self.config_path.display(),
                error = %e,
                "Reloaded config rejected, keeping current routes"
            ),
        }
    }

    /// Move the routes file watch to `routes` if the reloaded config names a different file.
    fn follow_routes_file<W: Watcher>(&mut self, watcher: &mut W, routes: Option<PathBuf>) {
        if routes == self.routes_path {
            return;
        }
        if let Some(old) = &self.routes_path {
            if let Err(e) = watcher.unwatch(old) {
                tracing::warn!(path = %old.display(), error = ?e, "Failed to unwatch routes file");
            }
        }
        if let Some(new) = &routes {
            if let Err(e) = watcher.watch(new, RecursiveMode::NonRecursive) {
                tracing::warn!(path = %new.display(), error = ?e, "Failed to watch routes file");
            }
        }
        tracing::info!(from = ?self.routes_path, to = ?routes, "Routes file changed");
        self.routes_path = routes;
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}
