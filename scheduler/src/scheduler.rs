//! Per-target scheduling and sink dispatch.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use vigil_sinks::EventSink;
use vigil_watcher::{TargetConfig, WatchedTarget};

use crate::error::Result;
use crate::trigger::{FsNotifyTrigger, IntervalTrigger, Trigger, TriggerStrategy};

/// Default poll interval for the timer strategy.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long shutdown waits for pending sink writes before dropping them.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Orchestrates one scheduling task per watch target.
///
/// Each target owns its cursor, baseline, and context window outright;
/// nothing is shared between target loops except the sinks, which hold no
/// state that targets could contend on.
pub struct WatchScheduler {
    strategy: TriggerStrategy,
    poll_interval: Duration,
    targets: Vec<(TargetConfig, Vec<Arc<dyn EventSink>>)>,
    cancel: CancellationToken,
}

impl WatchScheduler {
    /// Create a scheduler using the given trigger strategy.
    pub fn new(strategy: TriggerStrategy) -> Self {
        Self {
            strategy,
            poll_interval: DEFAULT_POLL_INTERVAL,
            targets: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the poll interval for the timer strategy.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Add a target and the sinks that receive its events.
    pub fn add_target(&mut self, config: TargetConfig, sinks: Vec<Arc<dyn EventSink>>) {
        self.targets.push((config, sinks));
    }

    /// Handle used to request a clean shutdown.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Spawn every target loop and resolve once all of them have exited.
    ///
    /// Loops exit on shutdown: in-flight polls complete, pending sink
    /// writes get a bounded flush, and notification waits are interrupted.
    pub async fn run(self) -> Result<()> {
        let mut loops = JoinSet::new();

        for (config, sinks) in self.targets {
            let trigger = build_trigger(self.strategy, self.poll_interval, &config)?;
            loops.spawn(watch_loop(config, sinks, trigger, self.cancel.clone()));
        }

        while let Some(joined) = loops.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "watch loop aborted");
            }
        }

        Ok(())
    }
}

/// Cloneable handle that requests a clean shutdown of every watch loop.
#[derive(Clone)]
pub struct ShutdownHandle {
    cancel: CancellationToken,
}

impl ShutdownHandle {
    /// Ask every watch loop to stop after its current poll.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

fn build_trigger(
    strategy: TriggerStrategy,
    interval: Duration,
    config: &TargetConfig,
) -> Result<Box<dyn Trigger>> {
    match strategy {
        TriggerStrategy::Interval => Ok(Box::new(IntervalTrigger::new(interval))),
        TriggerStrategy::Notify => Ok(Box::new(FsNotifyTrigger::new(std::slice::from_ref(
            &config.path,
        ))?)),
    }
}

async fn watch_loop(
    config: TargetConfig,
    sinks: Vec<Arc<dyn EventSink>>,
    mut trigger: Box<dyn Trigger>,
    cancel: CancellationToken,
) {
    let name = config.name.clone();
    let mut target = WatchedTarget::new(config);
    let mut dispatches = JoinSet::new();

    info!(name = %name, "watch loop started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            wake = trigger.wait() => match wake {
                Ok(_) => poll_and_dispatch(&mut target, &sinks, &mut dispatches),
                Err(err) => {
                    warn!(name = %name, error = %err, "trigger failed, stopping loop");
                    break;
                }
            },
        }

        // Reap finished dispatch tasks without waiting on stragglers.
        while dispatches.try_join_next().is_some() {}
    }

    // Shutdown: give pending sink writes a bounded flush.
    let flush = async {
        while dispatches.join_next().await.is_some() {}
    };
    if tokio::time::timeout(FLUSH_TIMEOUT, flush).await.is_err() {
        warn!(name = %name, "sink flush timed out, dropping remaining writes");
    }

    info!(name = %name, "watch loop stopped");
}

fn poll_and_dispatch(
    target: &mut WatchedTarget,
    sinks: &[Arc<dyn EventSink>],
    dispatches: &mut JoinSet<()>,
) {
    let events = match target.poll() {
        Ok(events) => events,
        Err(err) => {
            warn!(name = %target.name(), error = %err, "poll failed, retrying next wake");
            return;
        }
    };

    for event in events {
        debug!(
            name = %target.name(),
            label = %event.classification.label,
            "dispatching event"
        );
        for sink in sinks {
            let sink = Arc::clone(sink);
            let event = event.clone();
            // One short-lived task per write: a stalled consumer delays
            // only its own frame, never the polling of any target.
            dispatches.spawn(async move {
                sink.send(&event).await;
            });
        }
    }
}
