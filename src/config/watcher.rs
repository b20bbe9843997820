//! Route manifest watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::routing::{load_manifest, RouteTree};

/// Watches a route manifest and publishes every tree rebuilt from it.
pub struct ManifestWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouteTree>,
}

impl ManifestWatcher {
    /// Returns the watcher and a receiver for rebuilt trees.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouteTree>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Route manifest change detected, reloading...");
                        match load_manifest(&path) {
                            Ok(tree) => {
                                let _ = tx.send(tree);
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to reload route manifest. Keeping current tree.");
                            }
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Manifest watcher started");
        Ok(watcher)
    }
}
