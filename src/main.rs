use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fadm_config::{Config, Overrides};
use fadm_core::{Engine, EngineConfig};
use fadm_repository::LocalRepository;
use fadm_result::{Status, render};

/// Fadm - a local dependency manager for compiled binary artifacts
#[derive(Parser)]
#[command(name = "fadm")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Local repository root (default: <config dir>/fadm/repository)
  #[arg(long, global = true, env = "FADM_REPOSITORY")]
  repository: Option<PathBuf>,

  /// Package source (URL or directory) for dependencies missing from the repository
  #[arg(long, global = true, env = "FADM_SOURCE")]
  source: Option<String>,

  /// Path to the configuration file (default: <config dir>/fadm/config.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Print the result tree as JSON once every step has completed
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Hook fadm into a project file, or into every project of a solution
  Add {
    /// Project (.csproj) or solution (.sln) file
    path: PathBuf,
  },

  /// Restore the dependencies declared by a project's fadm.xml
  Copy {
    /// Project directory, or any file inside it
    path: PathBuf,
  },

  /// Install a build output into the repository
  Install {
    /// Assembly to install (.dll or .exe)
    path: PathBuf,
  },
}

fn main() -> Result<ExitCode> {
  let Cli {
    repository,
    source,
    config,
    json,
    command,
  } = Cli::parse();

  init_tracing();

  let config = Config::resolve(Overrides { repository, source }, config.as_deref())
    .context("failed to load configuration")?;
  debug!(
    repository = %config.repository.display(),
    source = ?config.source,
    "configuration resolved"
  );

  let rt = tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
  let status = rt.block_on(run(command, config, json))?;

  if status.is_error() {
    Ok(ExitCode::FAILURE)
  } else {
    Ok(ExitCode::SUCCESS)
  }
}

/// Logs go to stderr so they never mix with the result trace on stdout.
fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

fn engine_config(config: Config) -> Result<EngineConfig> {
  let mut engine_config = EngineConfig::new(LocalRepository::new(config.repository));
  if let Some(location) = config.source {
    let source = fadm_package_source::open(&location)
      .with_context(|| format!("invalid package source '{location}'"))?;
    engine_config = engine_config.with_source(source);
  }
  Ok(engine_config)
}

async fn run(command: Commands, config: Config, json: bool) -> Result<Status> {
  let engine = Engine::new(engine_config(config)?);

  let result = match command {
    Commands::Add { path } => engine.add(&path).await,
    Commands::Copy { path } => engine.copy(&path).await,
    Commands::Install { path } => engine.install(&path).await,
  }
  .context("invalid command")?;
  let status = result.status();

  if json {
    let tree = result.resolve().await;
    println!("{}", serde_json::to_string_pretty(&tree)?);
  } else {
    let mut stdout = io::stdout().lock();
    render(result, &mut stdout)
      .await
      .context("failed to write output")?;
  }

  Ok(status)
}
