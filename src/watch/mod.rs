//! Watch mode: filesystem events in, incremental rebuilds out.
//!
//! ```text
//! notify -> Debouncer (pure timing) -> partition (filtering) -> Dispatcher
//! ```
//!
//! The loop is synchronous: notify delivers into an mpsc channel, the loop
//! blocks with a timeout derived from the debouncer, and rebuilds run on
//! this thread. A completed rebuild signals the reload channel even when
//! some files failed (their outputs are skipped, the rest are fresh); a
//! fatal pass keeps the last good outputs and the browser alone.

mod debouncer;

pub use debouncer::{ChangeKind, Debouncer};

use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use notify::{RecursiveMode, Watcher};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::config::Config;
use crate::core;
use crate::dispatch::{Dispatcher, is_reserved};
use crate::reload::ReloadChannel;
use crate::utils::path::{normalize_path, relative_to};
use crate::{debug, log, logger};

/// How often the loop wakes to poll the shutdown flag even when idle.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to watch `{path}`")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// One debounced batch, filtered down to what the dispatcher should see.
#[derive(Debug, Default)]
struct ChangeSet {
    /// Project-relative files to rebuild (created or modified).
    rebuild: Vec<PathBuf>,
    /// Project-relative files that vanished; cache entries are dropped,
    /// their stale outputs are left for `clean`.
    removed: Vec<PathBuf>,
    /// The config file itself was touched.
    config_touched: bool,
}

impl ChangeSet {
    fn is_empty(&self) -> bool {
        self.rebuild.is_empty() && self.removed.is_empty()
    }

    fn len(&self) -> usize {
        self.rebuild.len() + self.removed.len()
    }
}

/// The watch-mode driver. Owns the debouncer; shares the dispatcher (and
/// through it the step cache) with the rest of the session.
pub struct WatchLoop {
    dispatcher: Dispatcher,
    reload: ReloadChannel,
    /// Absolute path of the loaded config file.
    config_path: PathBuf,
}

impl WatchLoop {
    pub fn new(dispatcher: Dispatcher, reload: ReloadChannel, config_path: &Path) -> Self {
        Self {
            dispatcher,
            reload,
            config_path: normalize_path(config_path),
        }
    }

    /// Block on filesystem events until shutdown is requested.
    pub fn run(&self) -> Result<(), WatchError> {
        let root = self.dispatcher.config().root.clone();

        let (tx, rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |result| {
            let _ = tx.send(result);
        })
        .map_err(|source| WatchError::Watch {
            path: root.clone(),
            source,
        })?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Watch {
                path: root.clone(),
                source,
            })?;

        let watch = &self.dispatcher.config().watch;
        let mut debouncer = Debouncer::new(
            Duration::from_millis(watch.debounce_ms),
            Duration::from_millis(watch.cooldown_ms),
        );

        log!("watch"; "watching {} (ctrl+c to stop)", root.display());

        while !core::is_shutdown() {
            match rx.recv_timeout(debouncer.sleep_duration().min(SHUTDOWN_POLL)) {
                Ok(Ok(event)) => debouncer.add_event(&event),
                Ok(Err(e)) => log!("watch"; "notify error: {e}"),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if let Some(changes) = debouncer.take_if_ready() {
                self.handle_batch(changes);
            }
        }

        Ok(())
    }

    fn handle_batch(&self, changes: FxHashMap<PathBuf, ChangeKind>) {
        let config = self.dispatcher.config();
        let batch = partition_changes(config, &self.config_path, changes);

        if batch.config_touched {
            log!("watch"; "config file changed; restart to apply");
        }
        if batch.is_empty() {
            return;
        }

        // Drop cached results for everything in the batch. Removed files
        // only invalidate; their inputs are gone.
        for rel in batch.rebuild.iter().chain(&batch.removed) {
            self.dispatcher.cache().invalidate(rel);
        }
        for rel in &batch.removed {
            debug!("watch"; "removed: {}", rel.display());
        }

        match self.dispatcher.run_incremental(&batch.rebuild) {
            Ok(report) => {
                report.log_watch_status(batch.len());
                // Per-file failures are recovered and the pass still
                // updated the tree. Only a fatal pass withholds the
                // reload.
                self.reload.signal();
            }
            Err(e) => logger::status_error("rebuild failed", &e.to_string()),
        }
    }
}

/// Filter a debounced batch down to project files the pipeline cares
/// about: paths made root-relative, reserved directories dropped, the
/// config file flagged, removals split out.
fn partition_changes(
    config: &Config,
    config_path: &Path,
    changes: FxHashMap<PathBuf, ChangeKind>,
) -> ChangeSet {
    let mut batch = ChangeSet::default();

    for (path, kind) in changes {
        if path == config_path {
            batch.config_touched = true;
            continue;
        }

        let Some(rel) = relative_to(&config.root, &path) else {
            continue;
        };
        if is_reserved(config, &rel) {
            continue;
        }

        match kind {
            ChangeKind::Removed => batch.removed.push(rel),
            ChangeKind::Created | ChangeKind::Modified => {
                // Directory creation arrives as a Create event too.
                if path.is_file() {
                    batch.rebuild.push(rel);
                }
            }
        }
    }

    batch.rebuild.sort_unstable();
    batch.removed.sort_unstable();
    batch
}
