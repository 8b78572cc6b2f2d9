//! Watching the state file for outside edits.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Watches one file and reports when it changes on disk.
///
/// The parent directory is watched, so editors that replace the file instead of writing in
/// place are still noticed.
pub struct StateWatcher {
    _watcher: RecommendedWatcher,
}

impl StateWatcher {
    /// Start watching `path`.
    ///
    /// Returns the watcher and a channel receiving the path after each debounced change.
    pub fn new(path: &Path) -> Result<(Self, async_mpsc::Receiver<PathBuf>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(16);

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| std::io::Error::other(format!("{} is not a file", path.display())))?
            .to_os_string();

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(std::io::Error::other)?;

        let target = path.to_path_buf();
        std::thread::spawn(move || {
            let debounce = Duration::from_millis(100);
            let mut last: Option<Instant> = None;

            while let Ok(event) = sync_rx.recv() {
                if !is_change(&event.kind) {
                    continue;
                }
                if !event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == Some(file_name.as_os_str()))
                {
                    continue;
                }

                let now = Instant::now();
                if last.is_some_and(|l| now.duration_since(l) < debounce) {
                    continue;
                }
                last = Some(now);

                if async_tx.blocking_send(target.clone()).is_err() {
                    break;
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
