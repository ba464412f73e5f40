//! Wake-up strategies for the watch loops.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, error};

use crate::error::{Result, SchedulerError};

/// Which trigger strategy the scheduler uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStrategy {
    /// Sleep a fixed interval between polls.
    Interval,

    /// Suspend on OS change notifications.
    Notify,
}

impl Default for TriggerStrategy {
    fn default() -> Self {
        Self::Interval
    }
}

/// Why a watch loop woke up.
#[derive(Debug, Clone)]
pub enum Wake {
    /// The poll interval elapsed.
    Interval,

    /// The OS reported changes under these paths. An empty list means the
    /// signal did not identify specific files; poll everything.
    FsChange(Vec<PathBuf>),
}

/// A pluggable wait-for-next-trigger capability.
///
/// Implementations must suspend rather than busy-wait; cancellation is
/// handled by the caller racing `wait` against a shutdown signal.
#[async_trait]
pub trait Trigger: Send {
    /// Suspend until the next wake-up.
    async fn wait(&mut self) -> Result<Wake>;
}

/// Fixed-interval timer trigger.
pub struct IntervalTrigger {
    period: Duration,
}

impl IntervalTrigger {
    /// Wake every `period`.
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

#[async_trait]
impl Trigger for IntervalTrigger {
    async fn wait(&mut self) -> Result<Wake> {
        time::sleep(self.period).await;
        Ok(Wake::Interval)
    }
}

/// OS change-notification trigger.
///
/// Log writers touch the file, not the directory entry we hold, so file
/// targets are watched through their parent directory. The notify watcher
/// lives as long as the trigger; dropping the trigger stops the OS watch.
pub struct FsNotifyTrigger {
    /// Kept alive for the duration of the watch.
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<Vec<PathBuf>>,
}

impl FsNotifyTrigger {
    /// Watch `paths`: directories recursively, files via their parent.
    pub fn new(paths: &[PathBuf]) -> Result<Self> {
        let (tx, rx) = mpsc::channel(256);

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if event.kind.is_access() {
                        return;
                    }
                    if let Err(err) = tx.blocking_send(event.paths) {
                        debug!(error = %err, "wake receiver gone, dropping notification");
                    }
                }
                Err(err) => {
                    error!(error = %err, "watch error");
                }
            },
        )?;

        for path in paths {
            let (watch_path, mode) = if path.is_dir() {
                (path.clone(), RecursiveMode::Recursive)
            } else {
                let parent = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                (parent, RecursiveMode::NonRecursive)
            };
            watcher.watch(&watch_path, mode)?;
        }

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }
}

#[async_trait]
impl Trigger for FsNotifyTrigger {
    async fn wait(&mut self) -> Result<Wake> {
        match self.rx.recv().await {
            Some(paths) => Ok(Wake::FsChange(paths)),
            None => Err(SchedulerError::TriggerClosed),
        }
    }
}
