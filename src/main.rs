// src/main.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use review_carousel::carousel::{Container, InputEvent};
use review_carousel::content::{ContentSource, FileContentSource, HttpContentSource};
use review_carousel::markup::review_summary;
use review_carousel::render::TerminalPresenter;
use review_carousel::runtime::{self, load_feed_deck};
use review_carousel::{CarouselConfig, CarouselStatus, SlideSource};

#[derive(Parser)]
#[command(name = "review-carousel")]
#[command(about = "Inspect and preview the review carousel", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the review feed and print what the carousel would rotate through
    Check(FeedArgs),
    /// Run the carousel in the terminal
    Preview {
        #[command(flatten)]
        feed: FeedArgs,

        /// How long to run, in seconds
        #[arg(long, default_value_t = 20)]
        seconds: u64,
    },
}

#[derive(Args)]
struct FeedArgs {
    /// Review feed URL (overrides content_url)
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Review feed JSON file
    #[arg(long)]
    file: Option<PathBuf>,
}

impl FeedArgs {
    fn source(&self, config: &CarouselConfig) -> anyhow::Result<Arc<dyn ContentSource>> {
        if let Some(path) = &self.file {
            return Ok(Arc::new(FileContentSource::new(path)));
        }
        let url = self
            .url
            .clone()
            .or_else(|| config.content_url.clone())
            .context("no feed given: pass --url, --file or set content_url")?;
        Ok(Arc::new(HttpContentSource::new(url, config.fetch_timeout())?))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CarouselConfig::load(cli.config.as_deref())?;

    // Set up logging before any async code runs
    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(tracing::Level::INFO)
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match &cli.command {
        Command::Check(feed) => check(&config, feed).await,
        Command::Preview { feed, seconds } => preview(config.clone(), feed, *seconds).await,
    }
}

async fn check(config: &CarouselConfig, feed: &FeedArgs) -> anyhow::Result<()> {
    let source = feed.source(config)?;
    let deck = load_feed_deck(source.as_ref(), config.max_slides)
        .await
        .with_context(|| format!("loading {}", source.describe()))?;

    println!("{} slides from {}", deck.len(), source.describe());
    for (slide, delay) in deck.slides.iter().zip(&deck.overrides) {
        let period = delay.unwrap_or(config.rotation_period());
        let summary = slide
            .content
            .review
            .as_ref()
            .map(review_summary)
            .unwrap_or_default();
        println!("  {:>2}. [{:>5} ms] {}", slide.index + 1, period.as_millis(), summary);
    }
    Ok(())
}

async fn preview(config: CarouselConfig, feed: &FeedArgs, seconds: u64) -> anyhow::Result<()> {
    info!("{}", config.summary());
    let source = SlideSource::Feed(feed.source(&config)?);
    let presenter = Box::new(TerminalPresenter::new(std::io::stdout()));

    let mut handle = runtime::spawn(Container::new("preview"), config, source, presenter);
    match handle.loaded().await {
        CarouselStatus::Ready { slides } => info!("Previewing {} slides for {}s", slides, seconds),
        other => anyhow::bail!("carousel did not start: {:?}", other),
    }

    // A terminal is always "in view"
    handle.send(InputEvent::Intersection(1.0));

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(seconds)) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    handle.shutdown().await;
    Ok(())
}
