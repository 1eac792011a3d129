//! Feature-flag watcher for hot route-table rebuilds.
//!
//! # Responsibilities
//! - Watch the config file for changes
//! - Re-read it and extract the feature flags
//! - Emit flags only when they differ from the last ones seen
//!
//! # Design Decisions
//! - Editors often emit several events per save; unchanged flags are dropped
//! - An unreadable or invalid file keeps the current flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::FeatureFlags;

/// Watches a config file and sends changed feature flags.
pub struct FlagWatcher {
    path: PathBuf,
    current: FeatureFlags,
    update_tx: mpsc::UnboundedSender<FeatureFlags>,
}

impl FlagWatcher {
    /// `current` is the flag set the route tables were built with.
    pub fn new(path: &Path, current: FeatureFlags) -> (Self, mpsc::UnboundedReceiver<FeatureFlags>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                current,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            mut current,
            update_tx,
        } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    if let Some(flags) = changed_flags(&path, &mut current) {
                        tracing::info!(new_sale_page = flags.new_sale_page, "Feature flags changed");
                        let _ = update_tx.send(flags);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Flag watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?watched, "Flag watcher started");
        Ok(watcher)
    }
}

/// Reload flags from `path`, returning them if they differ from `current`.
pub fn changed_flags(path: &Path, current: &mut FeatureFlags) -> Option<FeatureFlags> {
    match load_config(path) {
        Ok(config) if config.features != *current => {
            *current = config.features.clone();
            Some(config.features)
        }
        Ok(_) => {
            tracing::debug!("Config changed but feature flags did not");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Config reload failed, keeping current route tables");
            None
        }
    }
}
