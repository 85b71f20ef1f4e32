mod api;
mod app;
mod cache;
mod config;
mod coordinator;
mod event;
mod state;
mod ui;

#[cfg(test)]
mod testing;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use api::client::AnyBackend;
use cache::{CacheStorage, MemoryStorage, NoopStorage};
use coordinator::Coordinator;

#[derive(Parser, Debug)]
#[command(name = "txview")]
#[command(about = "A terminal viewer for employee card transactions")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/txview/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base url of the transactions API (default: built-in demo data)
  #[arg(short, long)]
  api_url: Option<String>,

  /// Directory for the log file (default: $XDG_DATA_HOME/txview)
  #[arg(long)]
  log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let log_dir = match args.log_dir {
    Some(dir) => dir,
    None => default_log_dir()?,
  };
  let _log_guard = init_logging(&log_dir)?;

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Override api url if specified on command line
  if let Some(url) = args.api_url {
    config.api.url = Some(url);
  }

  let backend = AnyBackend::from_config(&config)?;
  let storage: Arc<dyn CacheStorage> = if config.cache.enabled {
    Arc::new(MemoryStorage::new())
  } else {
    Arc::new(NoopStorage)
  };
  info!(
    source = %backend.describe(),
    cache = config.cache.enabled,
    "starting txview"
  );

  let source = backend.describe();
  let (handle, _task) = coordinator::spawn(Coordinator::new(backend, storage));

  // Initialize and run the app
  let title = config.title.clone().unwrap_or_else(|| "txview".to_string());
  let mut app = app::App::new(handle, title, source);
  app.run().await?;

  Ok(())
}

fn default_log_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("txview"))
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(dir: &Path) -> Result<WorkerGuard> {
  std::fs::create_dir_all(dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::never(dir, "txview.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("txview=info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .with_target(true)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}
