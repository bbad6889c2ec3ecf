//! Artwork file change detection
//!
//! Watches the directory holding a file-backed artwork and reports when the
//! file itself was rewritten, so the viewer can re-decode it. Editors usually
//! save through a temp file plus rename, so the parent directory is watched
//! rather than the file.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::{Duration, Instant};

/// Watches one artwork file and signals debounced changes
pub struct ArtworkWatcher {
    /// Kept alive to maintain the watch
    _watcher: RecommendedWatcher,
    receiver: Receiver<Result<Event, notify::Error>>,
    /// Watched file, canonicalized where possible
    path: PathBuf,
    /// Last time a matching event arrived
    last_change: Option<Instant>,
    debounce_duration: Duration,
}

impl ArtworkWatcher {
    /// Start watching `path`
    pub fn new(path: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tracing::info!("Watching artwork for changes: {}", path.display());
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            path,
            last_change: None,
            debounce_duration: Duration::from_millis(100),
        })
    }

    /// The watched file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_target(&self, candidate: &Path) -> bool {
        if candidate == self.path {
            return true;
        }
        // Events for files that no longer exist can't be canonicalized.
        candidate.file_name().is_some() && candidate.file_name() == self.path.file_name()
    }

    /// Returns true once the file changed and the debounce window has passed
    pub fn poll(&mut self) -> bool {
        loop {
            match self.receiver.try_recv() {
                Ok(Ok(event)) => {
                    if matches!(event.kind, EventKind::Access(_)) {
                        continue;
                    }
                    if event.paths.iter().any(|p| self.is_target(p)) {
                        self.last_change = Some(Instant::now());
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!("Artwork watcher error: {:?}", e);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!("Artwork watcher channel disconnected");
                    break;
                }
            }
        }

        match self.last_change {
            Some(last) if last.elapsed() >= self.debounce_duration => {
                self.last_change = None;
                tracing::info!("Artwork changed on disk: {}", self.path.display());
                true
            }
            _ => false,
        }
    }
}
