//! Vigil: watch logs and source trees, classify new content, react.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod responder;

use config::RunConfig;
use responder::Responder;
use vigil_scheduler::WatchScheduler;
use vigil_sinks::{DatagramSink, EventSink, InferenceBridge, StreamSink};

const DEFAULT_LOG_FILTER: &str = "vigil=info,vigil_watcher=info,vigil_sinks=info,vigil_scheduler=info";

/// Watch logs and source trees, classify new content, and fan events out.
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about)]
struct Cli {
    /// Path to the TOML run configuration.
    #[arg(short, long, default_value = "vigil.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let run = RunConfig::load(&cli.config)?;

    let sinks = build_sinks(&run).await?;
    let mut scheduler = WatchScheduler::new(run.trigger)
        .with_poll_interval(Duration::from_millis(run.poll_interval_ms));
    for target in run.targets {
        info!(name = %target.name, path = %target.path.display(), "watching");
        scheduler.add_target(target, sinks.clone());
    }

    let shutdown = scheduler.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            shutdown.shutdown();
        }
    });

    scheduler.run().await?;
    info!("all watch loops stopped");
    Ok(())
}

async fn build_sinks(run: &RunConfig) -> Result<Vec<Arc<dyn EventSink>>> {
    let mut sinks: Vec<Arc<dyn EventSink>> = Vec::new();

    if let Some(addr) = run.sinks.datagram {
        sinks.push(Arc::new(DatagramSink::new(addr).await?));
        info!(%addr, "datagram sink ready");
    }

    let stream = match run.sinks.stream {
        Some(addr) => Some(Arc::new(StreamSink::connect(addr).await.with_context(
            || format!("stream consumer unreachable at {addr}"),
        )?)),
        None => None,
    };
    if let Some(stream) = &stream {
        sinks.push(Arc::clone(stream) as Arc<dyn EventSink>);
    }

    if let Some(bridge_config) = &run.bridge {
        let delivery = stream
            .clone()
            .context("bridge requires a stream sink to deliver replies")?;
        let bridge = InferenceBridge::connect_with_timeout(
            bridge_config.addr,
            Duration::from_secs(bridge_config.timeout_secs),
        )
        .await?;
        sinks.push(Arc::new(Responder::new(bridge, delivery)));
        info!(addr = %bridge_config.addr, "inference bridge connected");
    }

    Ok(sinks)
}
