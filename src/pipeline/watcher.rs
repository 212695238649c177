//! Directory watcher feeding created files to the pipeline
//!
//! The notify callback only queues paths; a single consumer task takes them
//! off the queue and runs the pipeline for one file at a time, so settle
//! delays and read retries never block the notification thread.

use super::WatchPipeline;
use crate::config::WatcherConfig;
use crate::constants::EVENT_QUEUE_CAPACITY;
use crate::error::Result;
use crate::models::ProcessingStats;
use notify::event::CreateKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::future::Future;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Watches one directory and converts every matching file created in it
#[derive(Debug)]
pub struct DirectoryWatcher {
    config: WatcherConfig,
    pipeline: WatchPipeline,
}

impl DirectoryWatcher {
    pub fn new(config: WatcherConfig) -> Self {
        let pipeline = WatchPipeline::from_config(&config);
        Self { config, pipeline }
    }

    /// Register the OS watch and return the queue of created files
    ///
    /// Events stop arriving once the returned watcher is dropped.
    pub fn subscribe(&self) -> Result<(RecommendedWatcher, mpsc::Receiver<PathBuf>)> {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let config = self.config.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for path in created_files(&event, &config) {
                        if tx.blocking_send(path).is_err() {
                            // Consumer is gone, shutting down
                            return;
                        }
                    }
                }
                Err(e) => error!("File watching error: {}", e),
            },
            Config::default(),
        )?;

        watcher.watch(&self.config.watch_folder, RecursiveMode::NonRecursive)?;
        info!(
            "Watching {} for {} files",
            self.config.watch_folder.display(),
            self.config.file_pattern
        );

        Ok((watcher, rx))
    }

    /// Watch until `shutdown` completes, then report what was processed
    pub async fn run<F>(self, shutdown: F) -> Result<ProcessingStats>
    where
        F: Future<Output = ()>,
    {
        let (_watcher, rx) = self.subscribe()?;
        Ok(self.consume(rx, shutdown).await)
    }

    /// Single consumer: process queued files one at a time
    ///
    /// Shutdown is only observed between files; a file being processed is
    /// always finished first.
    pub async fn consume<F>(&self, mut rx: mpsc::Receiver<PathBuf>, shutdown: F) -> ProcessingStats
    where
        F: Future<Output = ()>,
    {
        let mut stats = ProcessingStats::default();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping watcher");
                    break;
                }
                next = rx.recv() => match next {
                    Some(path) => {
                        let outcome = self.pipeline.process_file(&path).await;
                        debug!("Outcome for {}: {:?}", path.display(), outcome);
                        stats.record(&outcome);
                    }
                    None => {
                        warn!("Event queue closed, stopping watcher");
                        break;
                    }
                },
            }
        }

        stats
    }
}

/// Paths of newly created files in `event` that match the configured filter
pub fn created_files(event: &Event, config: &WatcherConfig) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(CreateKind::File) | EventKind::Create(CreateKind::Any) => event
            .paths
            .iter()
            .filter(|path| config.matches_file(path))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}
