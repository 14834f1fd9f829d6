//! Re-reads the config file when it changes on disk and pushes the result
//! into the reactor, which fans it out to the other actors.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tracing::{info, warn};

use crate::actor::reactor;
use crate::common::config::Config;

const DEBOUNCE: Duration = Duration::from_millis(250);

/// Starts watching `path`. Returns the watcher handle; dropping it stops the
/// watching. A config that fails to parse is ignored with a warning and the
/// running config stays in effect.
pub fn spawn(
    path: PathBuf,
    reactor_tx: reactor::Sender,
) -> notify::Result<Debouncer<RecommendedWatcher>> {
    let watched = path.clone();
    let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| match result {
        Ok(events) => {
            if !events.iter().any(|event| event.path == watched) {
                return;
            }
            match Config::load(&watched) {
                Ok(config) => {
                    info!("configuration reloaded from {}", watched.display());
                    _ = reactor_tx.try_send(reactor::Event::ConfigUpdated(config));
                }
                Err(err) => warn!("ignoring config change: {err:#}"),
            }
        }
        Err(err) => warn!("config watch error: {err}"),
    })?;

    // Watch the parent directory so editors that replace the file atomically
    // are still observed.
    let target = path.parent().map(Path::to_path_buf).unwrap_or(path);
    debouncer.watcher().watch(&target, RecursiveMode::NonRecursive)?;
    Ok(debouncer)
}
