// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::pipeline::sources::relative_str;
use crate::watch::dispatch::WatchEvent;
use crate::watch::patterns::CompiledBinding;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher observing `root` recursively; for every
/// create/modify/delete event whose path matches a binding, a
/// [`WatchEvent::TaskTriggered`] is sent for that binding's task.
///
/// Bindings are independent: one event can trigger several tasks, and a
/// path matching no binding is ignored. The watcher never terminates on
/// its own once started.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    bindings: Vec<CompiledBinding>,
    events_tx: mpsc::Sender<WatchEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone()); // best-effort

    let bindings = Arc::new(bindings);

    // Channel from the blocking notify callback into the async world.
    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<Event>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = raw_tx.send(event) {
                    // tracing isn't safe to assume here; fall back to stderr.
                    eprintln!("assetforge: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("assetforge: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!(root = %root.display(), "file watcher started");

    // Async task that consumes notify events and forwards task triggers.
    let async_root = root.clone();
    let async_bindings = Arc::clone(&bindings);
    tokio::spawn(async move {
        while let Some(event) = raw_rx.recv().await {
            debug!(?event, "received notify event");

            for path in &event.paths {
                let Some(rel) = relative_str(&async_root, path) else {
                    debug!(path = %path.display(), "event path outside watch root");
                    continue;
                };

                for binding in async_bindings.iter() {
                    if !binding.matches(&rel) {
                        continue;
                    }
                    debug!(task = binding.task(), path = %rel, "watch match -> triggering task");
                    if let Err(err) = events_tx
                        .send(WatchEvent::TaskTriggered {
                            task: binding.task().to_string(),
                            path: path.clone(),
                        })
                        .await
                    {
                        warn!("failed to send watch trigger: {err}");
                        // Dispatcher is gone; no point keeping this loop alive.
                        return;
                    }
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}
