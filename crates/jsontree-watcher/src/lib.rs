//! Filesystem watching for the served JSON document

pub mod watcher;

pub use watcher::{FileWatcher, ReloadOutcome, WatchEvent, WatcherService, reload_file};
