//! `bulkwatch` -- terminal dashboard for bulk actions.
//!
//! Lists bulk actions with summary counts, or shows one action with its
//! streamed log lines. With `--watch` the view follows live updates from
//! the push channel until Ctrl-C.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default          | Description                      |
//! |------------------------|----------|------------------|----------------------------------|
//! | `BACKEND_URL`          | yes      | --               | REST and log stream base URL     |
//! | `PUSHER_KEY`           | no       | --               | Push channel app key             |
//! | `PUSHER_CLUSTER`       | no       | --               | Push channel cluster             |
//! | `PUSHER_HOST`          | no       | --               | Self-hosted push server override |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`             | REST request timeout             |
//! | `RUST_LOG`             | no       | `bulkwatch=info` | Log filter (written to stderr)   |

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bulkwatch_dashboard::app::App;
use bulkwatch_dashboard::cli::Cli;
use bulkwatch_dashboard::config::DashboardConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bulkwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::from_env().context("Invalid configuration")?;

    tracing::info!(
        backend_url = %config.backend_url,
        fetch_only = config.is_fetch_only(),
        "Starting bulkwatch",
    );

    let app = App::new(&config)?;
    app.run(cli.command).await?;
    Ok(())
}
