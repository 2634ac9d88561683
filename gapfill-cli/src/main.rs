//! `gapfill`: find missing hours of cabled instrument data and replay them
//! through the `playback` ingester, never submitting an hour twice.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use gapfill_config::{ConfigLoad, ConfigLoader};
use gapfill_core::{
    HttpGapReporter, ProcessInvoker, RunCoordinator, SinkAddresses,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "gapfill", version)]
#[command(
    about = "Replay missing cabled instrument data through the playback ingester",
    after_help = "Example:\n  gapfill \
        'qpid://guest/guest@uframe-test?queue=Ingest.instrument_events' \
        'qpid://guest/guest@uframe-test?queue=Ingest.instrument_particles' \
        uframe-test"
)]
struct Cli {
    /// Queue address the player publishes instrument events to
    event_url: String,

    /// Queue address the player publishes data particles to
    particle_url: String,

    /// Server that knows the reference designators and their data gaps
    server: String,

    /// Verbose logging (debug level)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet logging (warnings and errors only)
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn default_directive(&self) -> &'static str {
        if self.verbose {
            "debug,hyper=info,reqwest=info"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.default_directive().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let ConfigLoad {
        config,
        source,
        overrides,
    } = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;
    info!(%source, "configuration loaded");
    for name in &overrides {
        info!(variable = name, "configuration overridden from environment");
    }
    if config.replay.kill_on_timeout {
        info!(
            timeout_secs = config.replay.timeout_secs,
            "overrunning playbacks will be killed"
        );
    } else {
        warn!(
            timeout_secs = config.replay.timeout_secs,
            "overrunning playbacks will be left running"
        );
    }

    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("failed to build http client")?;
    let reporter = HttpGapReporter::new(
        client.clone(),
        config.gaps.inventory_url.clone(),
        config.gaps.missing_url.clone(),
    );
    let invoker = ProcessInvoker::new(
        config.replay.timeout(),
        config.replay.timeout_policy(),
    );
    let coordinator = RunCoordinator::new(
        config.coordinator_settings()?,
        reporter,
        invoker,
        client,
    );

    let sinks = SinkAddresses {
        event_url: cli.event_url,
        particle_url: cli.particle_url,
    };
    coordinator
        .run(sinks, &cli.server)
        .await
        .context("gap replay run aborted")?;
    Ok(())
}
