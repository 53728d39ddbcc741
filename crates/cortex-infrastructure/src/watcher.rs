//! Filesystem watcher
//!
//! A recursive notify watch feeds a timer-resettable debounce actor. Any
//! admitted event restarts the window; when it expires the accumulated path
//! set becomes the hint of one incremental index call. The actor awaits
//! that call inline, so a second index can never start while one is
//! running - events arriving meanwhile stay queued and merge into the next
//! window.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use cortex_application::discovery::FileDiscovery;
use cortex_application::indexing::Indexer;
use cortex_domain::error::{Error, Result};

/// Stop is guaranteed to return within this bound
const STOP_GRACE: Duration = Duration::from_millis(100);

/// Idle timer target when no events are pending
const FAR_FUTURE: Duration = Duration::from_secs(24 * 60 * 60);

/// Debounced filesystem watcher driving incremental index calls
pub struct FileWatcher {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl FileWatcher {
    /// Start watching the discovery's root. Events on paths discovery would
    /// not admit are dropped before they can restart the debounce window.
    pub fn start(
        discovery: FileDiscovery,
        indexer: Arc<Indexer>,
        debounce: Duration,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel::<notify::Event>();

        let mut watcher: RecommendedWatcher =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                match result {
                    Ok(event) => {
                        let _ = tx.send(event);
                    }
                    Err(e) => warn!(error = %e, "watch error"),
                }
            })
            .map_err(|e| Error::io_with_source("failed to create filesystem watcher", e))?;

        watcher
            .watch(discovery.root(), RecursiveMode::Recursive)
            .map_err(|e| {
                Error::io_with_source(
                    format!("failed to watch {}", discovery.root().display()),
                    e,
                )
            })?;

        let token = CancellationToken::new();
        let handle = tokio::spawn(Self::debounce_loop(
            watcher,
            rx,
            discovery,
            indexer,
            debounce,
            token.clone(),
        ));
        Ok(Self {
            token,
            handle: Some(handle),
        })
    }

    async fn debounce_loop(
        _watcher: RecommendedWatcher,
        mut rx: mpsc::UnboundedReceiver<notify::Event>,
        discovery: FileDiscovery,
        indexer: Arc<Indexer>,
        debounce: Duration,
        token: CancellationToken,
    ) {
        let mut pending: HashSet<PathBuf> = HashSet::new();
        let timer = tokio::time::sleep(FAR_FUTURE);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    let mut relevant = false;
                    for path in event.paths {
                        let admitted = discovery
                            .relativize(&path)
                            .map(|rel| discovery.admit(&rel).is_some())
                            .unwrap_or(false);
                        if admitted {
                            pending.insert(path);
                            relevant = true;
                        }
                    }
                    if relevant {
                        timer.as_mut().reset(tokio::time::Instant::now() + debounce);
                    }
                }
                _ = timer.as_mut(), if !pending.is_empty() => {
                    let hint: Vec<PathBuf> = pending.drain().collect();
                    timer.as_mut().reset(tokio::time::Instant::now() + FAR_FUTURE);
                    debug!(paths = hint.len(), "debounce window expired, indexing");
                    match indexer.index_with_cancellation(&hint, &token).await {
                        Ok(stats) => debug!(
                            files_added = stats.files_added,
                            files_modified = stats.files_modified,
                            files_deleted = stats.files_deleted,
                            "watch-triggered index finished"
                        ),
                        Err(e) => warn!(error = %e, "watch-triggered index failed"),
                    }
                }
            }
        }
    }

    /// Cancel the watch loop. Idempotent; returns within 100 ms even when
    /// an index call is in flight (the call itself observes the token).
    pub async fn stop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            // On timeout the loop is mid-index; it observes the token and
            // winds down on its own after we return
            let _ = tokio::time::timeout(STOP_GRACE, handle).await;
        }
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
