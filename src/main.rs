use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reflectory::config::SourceKind;
use reflectory::{
    build_source, Config, GiteaDestination, MirrorOutcome, MultiDiscovery, PlannedAction,
    Reconciler, RepositoryDescriptor,
};

#[derive(Parser)]
#[command(name = "reflectory")]
#[command(about = "Mirror GitHub and GitLab repositories into Gitea")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path (defaults to ./config.json, ./config.yml, then XDG config location)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing mirrors and refresh credentials of existing ones (default)
    Sync {
        /// Only probe the destination and report what would happen
        #[arg(long)]
        dry_run: bool,
    },

    /// List repositories discovered on the configured sources
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = Config::resolve_path(cli.config)?;
    let config = Config::load(&config_path).context("unable to read configuration")?;

    init_logging(cli.verbose || config.verbose)?;
    info!("Starting reflectory v{}", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Commands::Sync { dry_run: false }) {
        Commands::Sync { dry_run } => cmd_sync(dry_run, &config).await,
        Commands::List => cmd_list(&config).await,
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

/// Build every configured source and collect their descriptors.
///
/// A source that cannot be built is logged and skipped; ending up with no
/// repositories at all is fatal.
async fn discover(config: &Config) -> Result<Vec<RepositoryDescriptor>> {
    config.validate()?;

    let mut discovery = MultiDiscovery::new();
    for source_config in &config.sources {
        if source_config.kind == SourceKind::Unknown {
            warn!("unknown source type for source at {:?}", source_config.url);
            continue;
        }

        match build_source(source_config, config.destination.timeout()) {
            Ok(source) => discovery.add_source(source),
            Err(e) => error!("unable to init {:?} source: {}", source_config.kind, e),
        }
    }

    debug!("Discovering from {} sources", discovery.source_count());
    let repositories = discovery.discover_all().await;
    if repositories.is_empty() {
        bail!("no repositories found");
    }

    info!("Discovered {} repositories in total", repositories.len());
    Ok(repositories)
}

/// Reconcile every discovered repository against the destination
async fn cmd_sync(dry_run: bool, config: &Config) -> Result<()> {
    let repositories = discover(config).await?;

    let destination =
        GiteaDestination::new(&config.destination).context("unable to init Gitea destination")?;
    let reconciler = Reconciler::new(Box::new(destination));

    if dry_run {
        println!("Dry run - probing {} repositories", repositories.len());

        for action in reconciler.plan(&repositories).await {
            match action {
                PlannedAction::Migrate { key } => println!("   migrate:      {}", key),
                PlannedAction::RefreshCredentials { key } => println!("   check creds:  {}", key),
                PlannedAction::ProbeFailed { key, error } => {
                    println!("   probe failed: {} ({})", key, error)
                }
            }
        }

        return Ok(());
    }

    let summary = reconciler.reconcile_all(&repositories).await;

    println!("\nReconciliation complete");
    println!("   Total repositories: {}", summary.total_repositories);
    println!("   Migrated:           {}", summary.migrated);
    println!("   Refreshed:          {}", summary.refreshed);
    println!("   Unchanged:          {}", summary.unchanged);
    println!("   Deferred:           {}", summary.deferred);
    println!("   Failed:             {}", summary.failed);
    println!("   Duration:           {:.2}s", summary.duration.as_secs_f64());

    if summary.failed > 0 {
        println!("\nFailed repositories:");
        for outcome in &summary.outcomes {
            if let MirrorOutcome::Failed { key, error } = outcome {
                println!("   {}: {}", key, error);
            }
        }
    }

    info!("DONE");
    Ok(())
}

/// List repositories that would be mirrored
async fn cmd_list(config: &Config) -> Result<()> {
    let repositories = discover(config).await?;

    println!("Repositories ({}):", repositories.len());
    for repo in &repositories {
        println!("   {} <- {} (as {})", repo.full_name(), repo.clone_url, repo.clone_username);
    }

    Ok(())
}
