//! Watches the served JSON file and rebuilds the session graph on change

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use jsontree_core::{GraphUpdate, LoadSummary, Session};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::Value;
use tokio::sync::{RwLock, broadcast, mpsc};
use tracing::{debug, error, info, warn};

/// Quiet period after the first event before re-reading the file.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The file was created or its contents changed
    Changed(PathBuf),
    /// The file was removed or renamed away
    Removed(PathBuf),
}

/// Watcher for a single file.
///
/// The parent directory is watched rather than the file itself so that
/// editors which replace the file on save keep being tracked.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    event_rx: mpsc::UnboundedReceiver<WatchEvent>,
    target: PathBuf,
}

impl FileWatcher {
    pub fn new(target: impl AsRef<Path>) -> Result<Self> {
        let target = std::path::absolute(target.as_ref())
            .with_context(|| format!("Cannot resolve {}", target.as_ref().display()))?;
        let file_name = target
            .file_name()
            .map(|n| n.to_os_string())
            .with_context(|| format!("{} is not a file path", target.display()))?;
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    debug!("File system event: {:?}", event);
                    Self::handle_notify_event(event, &file_name, &event_tx);
                }
                Err(e) => error!("File system watch error: {}", e),
            }
        })?;

        Ok(Self {
            watcher,
            event_rx,
            target,
        })
    }

    fn handle_notify_event(
        event: notify::Event,
        file_name: &std::ffi::OsStr,
        event_tx: &mpsc::UnboundedSender<WatchEvent>,
    ) {
        let removed = match event.kind {
            notify::EventKind::Create(_) | notify::EventKind::Modify(_) => false,
            notify::EventKind::Remove(_) => true,
            _ => return,
        };
        for path in event.paths {
            if path.file_name() != Some(file_name) {
                continue;
            }
            let watch_event = if removed {
                WatchEvent::Removed(path)
            } else {
                WatchEvent::Changed(path)
            };
            if let Err(e) = event_tx.send(watch_event) {
                warn!("Failed to send watch event: {}", e);
            }
        }
    }

    pub fn start(&mut self) -> Result<()> {
        let dir = self
            .target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        self.watcher.watch(dir, RecursiveMode::NonRecursive)?;
        info!("Watching file: {}", self.target.display());
        Ok(())
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn event_receiver(&mut self) -> &mut mpsc::UnboundedReceiver<WatchEvent> {
        &mut self.event_rx
    }
}

/// Result of re-reading the watched file.
#[derive(Debug, Clone, PartialEq)]
pub enum ReloadOutcome {
    Rebuilt(LoadSummary),
    /// Same document as the one already loaded.
    Unchanged,
    /// Unreadable, unparsable or ungraphable; the old graph is kept.
    Rejected(String),
}

/// Re-read `path` into `session`, broadcasting the resulting update.
pub async fn reload_file(
    path: &Path,
    session: &RwLock<Session>,
    update_tx: Option<&broadcast::Sender<String>>,
) -> ReloadOutcome {
    let publish = |update: GraphUpdate| {
        if let Some(tx) = update_tx {
            match update.to_json() {
                // It's okay if there are no receivers
                Ok(json) => {
                    let _ = tx.send(json);
                }
                Err(e) => error!("Failed to serialize graph update: {}", e),
            }
        }
    };

    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return ReloadOutcome::Rejected(e.to_string());
        }
    };
    let value: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            let err = jsontree_core::BuildError::from(e);
            warn!("Ignoring invalid JSON in {}: {}", path.display(), err);
            publish(GraphUpdate::failed(&err));
            return ReloadOutcome::Rejected(err.to_string());
        }
    };

    let mut session = session.write().await;
    if session.source() == Some(&value) {
        debug!("{} unchanged, skipping rebuild", path.display());
        return ReloadOutcome::Unchanged;
    }
    match session.load_value(value) {
        Ok(summary) => {
            publish(GraphUpdate::rebuilt(&session));
            ReloadOutcome::Rebuilt(summary)
        }
        Err(err) => {
            publish(GraphUpdate::failed(&err));
            ReloadOutcome::Rejected(err.to_string())
        }
    }
}

/// Ties a [`FileWatcher`] to a shared session.
pub struct WatcherService {
    watcher: FileWatcher,
    session: Arc<RwLock<Session>>,
    update_tx: Option<broadcast::Sender<String>>,
}

impl WatcherService {
    pub fn new(target: impl AsRef<Path>, session: Arc<RwLock<Session>>) -> Result<Self> {
        Ok(Self {
            watcher: FileWatcher::new(target)?,
            session,
            update_tx: None,
        })
    }

    /// Create a watcher service that broadcasts updates to WebSocket clients
    pub fn with_broadcast(
        target: impl AsRef<Path>,
        session: Arc<RwLock<Session>>,
        update_tx: broadcast::Sender<String>,
    ) -> Result<Self> {
        let mut service = Self::new(target, session)?;
        service.update_tx = Some(update_tx);
        Ok(service)
    }

    pub fn start_watching(&mut self) -> Result<()> {
        self.watcher.start()
    }

    pub async fn reload(&self) -> ReloadOutcome {
        reload_file(self.watcher.target(), &self.session, self.update_tx.as_ref()).await
    }

    /// Process file events until the watcher is dropped.
    pub async fn process_events(&mut self) -> Result<()> {
        let target = self.watcher.target().to_path_buf();
        let session = Arc::clone(&self.session);
        let update_tx = self.update_tx.clone();

        while let Some(event) = self.watcher.event_receiver().recv().await {
            // Editors emit bursts of events per save.
            tokio::time::sleep(DEBOUNCE).await;
            let mut last = event;
            while let Ok(next) = self.watcher.event_receiver().try_recv() {
                last = next;
            }

            // Atomic saves remove the file and rename a new one into place.
            if let WatchEvent::Removed(path) = &last {
                if !target.exists() {
                    warn!("Watched file removed: {}; keeping last graph", path.display());
                    continue;
                }
            }

            info!("File changed: {}", target.display());
            match reload_file(&target, &session, update_tx.as_ref()).await {
                ReloadOutcome::Rebuilt(summary) => info!(
                    "Rebuilt graph #{}: {} nodes",
                    summary.generation, summary.node_count
                ),
                ReloadOutcome::Unchanged => {}
                ReloadOutcome::Rejected(reason) => warn!("Keeping previous graph: {}", reason),
            }
        }
        Ok(())
    }
}
