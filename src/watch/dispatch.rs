// src/watch/dispatch.rs

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::tasks::registry::{TaskName, TaskRegistry};

/// Events consumed by the dispatch loop.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// A watched path changed; re-run the bound task.
    TaskTriggered { task: TaskName, path: PathBuf },
    /// Whole-process shutdown; end the loop.
    ShutdownRequested,
}

/// Consume watch events and re-run the bound tasks.
///
/// Every trigger is spawned as its own detached task run: overlapping
/// triggers for the same binding are not serialized against each other
/// (last writer wins on the output files), and one binding's slow or
/// failing task never delays another binding's events. A failed run is
/// logged and the loop keeps going; the loop only ends when the event
/// channel closes or shutdown is requested.
pub async fn dispatch_loop(registry: Arc<TaskRegistry>, mut events_rx: mpsc::Receiver<WatchEvent>) {
    info!("watch dispatcher started");

    while let Some(event) = events_rx.recv().await {
        match event {
            WatchEvent::TaskTriggered { task, path } => {
                info!(task = %task, path = %path.display(), "change detected; re-running task");

                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    if let Err(err) = registry.run(&task).await {
                        warn!(task = %task, error = %err, "watch-triggered task failed");
                    }
                });
            }
            WatchEvent::ShutdownRequested => {
                info!("watch dispatcher shutdown requested");
                break;
            }
        }
    }

    info!("watch dispatcher exiting");
}
