//! Raster API service and command-line tools.
//!
//! `serve` runs the HTTP server. `render`, `sample` and `legend` run a single
//! pipeline operation against the configured archive and exit.

use std::path::PathBuf;
use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use raster_common::{GeoPoint, Indicator, TimeIndex, YearMonth};
use tile_pipeline::{PipelineConfig, RasterService};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use raster_api::{build_router, metrics, state::AppState};

#[derive(Parser, Debug)]
#[command(name = "raster-api")]
#[command(about = "Monthly index raster service")]
struct Args {
    /// Pipeline configuration file (YAML)
    #[arg(long, env = "RASTER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Listen address
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Number of tokio worker threads (default: number of CPU cores)
        #[arg(long)]
        worker_threads: Option<usize>,
    },

    /// Render one month to a PNG file
    Render {
        #[arg(long)]
        indicator: Indicator,

        /// Month as YYYY-MM
        #[arg(long)]
        month: String,

        #[arg(long)]
        out: PathBuf,
    },

    /// Print a pixel's time series as JSON
    Sample {
        #[arg(long)]
        indicator: Indicator,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
    },

    /// Print the legend for the default range as JSON
    Legend {
        #[arg(long)]
        indicator: Indicator,

        /// Number of color steps
        #[arg(long, default_value_t = 16)]
        steps: usize,
    },
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level)?;

    // Build tokio runtime with configurable worker threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    let worker_threads = match &args.command {
        Command::Serve { worker_threads, .. } => *worker_threads,
        _ => None,
    };
    if let Some(threads) = worker_threads {
        info!("Configuring tokio runtime with {} worker threads", threads);
        runtime_builder.worker_threads(threads);
    } else if let Ok(threads_str) = env::var("TOKIO_WORKER_THREADS") {
        if let Ok(threads) = threads_str.parse::<usize>() {
            info!("Configuring tokio runtime with {} worker threads (from env)", threads);
            runtime_builder.worker_threads(threads);
        }
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))
}

fn init_tracing(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries command output; logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn async_main(args: Args) -> Result<()> {
    let config = PipelineConfig::load(args.config.as_deref()).context("loading configuration")?;

    match args.command {
        Command::Serve { listen, .. } => serve(config, &listen).await,
        Command::Render {
            indicator,
            month,
            out,
        } => render(config, indicator, &month, out).await,
        Command::Sample {
            indicator,
            lng,
            lat,
        } => sample(config, indicator, GeoPoint::new(lng, lat)).await,
        Command::Legend { indicator, steps } => legend(config, indicator, steps),
    }
}

async fn serve(config: PipelineConfig, listen: &str) -> Result<()> {
    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics::install_prometheus()?;
    info!("Prometheus metrics exporter initialized");
    info!("Starting raster API server");

    let state = Arc::new(AppState::new(config)?.with_prometheus(prometheus_handle));
    let app = build_router(state);

    let addr: SocketAddr = listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn render(
    config: PipelineConfig,
    indicator: Indicator,
    month: &str,
    out: PathBuf,
) -> Result<()> {
    let month = YearMonth::parse(month)?;
    let service = RasterService::from_config(config)?;
    let index: TimeIndex = service
        .codec()
        .index_of(month)
        .with_context(|| format!("{} is before the archive epoch", month))?;

    match service.render_png(indicator, index).await? {
        Some(png) => {
            std::fs::write(&out, png).with_context(|| format!("writing {}", out.display()))?;
            info!(indicator = %indicator, month = %month, path = %out.display(), "Rendered");
            Ok(())
        }
        None => anyhow::bail!("no {} raster for {}", indicator, month),
    }
}

async fn sample(config: PipelineConfig, indicator: Indicator, point: GeoPoint) -> Result<()> {
    let service = RasterService::from_config(config)?;

    let pb = ProgressBar::new(service.total_months() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} months {msg}")?
            .progress_chars("##-"),
    );

    let series = service
        .sample_time_series(indicator, point, |done, _total| pb.set_position(done as u64))
        .await?;
    pb.finish_and_clear();

    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}

fn legend(config: PipelineConfig, indicator: Indicator, steps: usize) -> Result<()> {
    let service = RasterService::from_config(config)?;
    let legend = service.legend(indicator, steps.max(2));
    println!("{}", serde_json::to_string_pretty(&legend)?);
    Ok(())
}
