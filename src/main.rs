//! Terminal front end for the incremental result loader.
//!
//! Runs one search session against a results endpoint, printing results as
//! they arrive and tracking slot fill progress. `--follow` simulates
//! scroll-to-bottom triggers after each completed chain.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use infill::{
    load_settings, ConsoleRenderer, HttpResultSource, PollState, Query, SearchLoader,
    ViewportMetrics,
};

#[derive(Parser)]
#[command(name = "infill", version, about = "Incrementally load search results from a query endpoint")]
struct Cli {
    /// Search text.
    query: String,

    /// Results endpoint base URL.
    #[arg(long, env = "INFILL_ENDPOINT")]
    endpoint: Option<String>,

    /// Result tab: general or images.
    #[arg(long, default_value = "general")]
    tab: String,

    /// Scroll-to-bottom batches to load after the first chain completes.
    #[arg(long, default_value_t = 0)]
    follow: u32,

    /// Disable the slot-fill progress bar.
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("infill=warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = load_settings().await;
    if let Some(endpoint) = cli.endpoint {
        settings.endpoint = endpoint.trim_end_matches('/').to_string();
    }

    let query = Query::from_parts(cli.query.clone(), Some(cli.tab.as_str()));
    let source = HttpResultSource::new(
        &settings.endpoint,
        &settings.user_agent,
        settings.request_timeout(),
    );

    let (renderer, progress) = if cli.no_progress {
        (ConsoleRenderer::new(), None)
    } else {
        let bar = ProgressBar::new(settings.batch_size(query.domain) as u64);
        bar.set_style(ProgressStyle::with_template(
            "{bar:30.cyan/dim} {pos}/{len} slots",
        )?);
        (ConsoleRenderer::with_progress(bar.clone()), Some(bar))
    };

    eprintln!(
        "searching {} for {}",
        style(&settings.endpoint).dim(),
        style(&cli.query).bold()
    );

    let loader = SearchLoader::new(query, source, renderer, settings);

    loader.start().await;
    track_until_stopped(&loader, progress.as_ref()).await;

    for _ in 0..cli.follow {
        let fired = loader.on_scroll(simulated_bottom()).await;
        if !fired {
            break;
        }
        track_until_stopped(&loader, progress.as_ref()).await;
    }

    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }

    let snapshot = loader.snapshot().await;
    eprintln!(
        "{} results loaded into {} slots",
        style(snapshot.cursor).bold(),
        snapshot.allocated
    );

    Ok(())
}

/// Mirror pool progress onto the bar until the poll loop stops.
async fn track_until_stopped<S, R>(loader: &SearchLoader<S, R>, progress: Option<&ProgressBar>)
where
    S: infill::ResultSource + 'static,
    R: infill::Renderer + Send + 'static,
    R::Handle: Send,
{
    loop {
        let snapshot = loader.snapshot().await;
        if let Some(bar) = progress {
            bar.set_length(snapshot.allocated as u64);
            bar.set_position(snapshot.filled as u64);
        }
        if snapshot.state == PollState::Stopped {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// A viewport snapshot sitting at document bottom, the position a real
/// page reports when the user scrolls to the end.
fn simulated_bottom() -> ViewportMetrics {
    ViewportMetrics {
        scroll_top: 10_000.0,
        viewport_height: 800.0,
        document_height: 10_800.0,
    }
}
