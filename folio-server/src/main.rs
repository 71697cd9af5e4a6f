//! # Folio Server
//!
//! Backend for the Folio portfolio site.
//!
//! - **Projects**: CRUD over portfolio entries whose image galleries are
//!   reconciled against locally stored uploads
//! - **Contact**: Gmail verification codes gating the quote request form
//! - **Orders**: chatbot order intake with confirmation mails
//! - **Analytics**: per-button click counters
//!
//! PostgreSQL is used when `DATABASE_URL` is set; otherwise everything
//! lives in process memory.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_config::{Config, ConfigLoad, ConfigLoader};
use folio_core::{
    LocalContentStore, LogMailer, Repositories, VerificationService,
    database::postgres,
};
use folio_server::{AppState, create_app};

/// How often expired verification codes are swept.
const PURGE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "folio-server")]
#[command(about = "Portfolio site backend: projects, galleries, contact and orders")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "FOLIO_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Path to a dotenv file (defaults to ./.env)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply database migrations and exit
    Migrate,
    /// Load and validate configuration, then exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_runtime_config(&cli)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(config).await,
        Command::Migrate => run_migrate(&config).await,
        Command::CheckConfig => {
            info!(
                bind = %config.server.bind_address(),
                public_base_url = %config.server.public_base_url,
                database = config.database.url.is_some(),
                "configuration is valid"
            );
            Ok(())
        }
    }
}

fn load_runtime_config(cli: &Cli) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &cli.env_file {
        loader = loader.with_env_file(path);
    }

    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = cli.serve.port {
        config.server.port = port;
    }
    if let Some(host) = cli.serve.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "loaded configuration file");
    }

    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(Arc::new(config))
}

async fn run_migrate(config: &Config) -> anyhow::Result<()> {
    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL must be set to run migrations")?;
    let pool = postgres::connect(url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL for migration")?;
    postgres::migrate(&pool)
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn build_repositories(config: &Config) -> anyhow::Result<Repositories> {
    match config.database.url.as_deref() {
        Some(url) => {
            let pool = postgres::connect(url, config.database.max_connections)
                .await
                .context("failed to connect to PostgreSQL")?;
            postgres::migrate(&pool)
                .await
                .context("database migration failed")?;
            info!("using PostgreSQL repositories");
            Ok(Repositories::postgres(pool))
        }
        None => {
            warn!("DATABASE_URL not set; data will not survive a restart");
            Ok(Repositories::in_memory())
        }
    }
}

fn spawn_verification_sweeper(verifications: Arc<VerificationService>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            match verifications.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "purged expired verification codes"),
                Err(err) => error!(error = %err, "verification purge failed"),
            }
        }
    });
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    let store = LocalContentStore::new(
        config.storage.root.clone(),
        &config.server.public_base_url,
    )
    .context("invalid storage configuration")?;
    store
        .ensure_root()
        .await
        .context("failed to prepare upload directory")?;

    let repositories = build_repositories(&config).await?;
    let mailer = Arc::new(LogMailer::new(config.mail.from.clone()));

    let state = AppState::new(Arc::clone(&config), repositories, store, mailer);
    spawn_verification_sweeper(Arc::clone(&state.verifications));

    let app = create_app(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        "Folio server listening on http://{} (uploads under {})",
        addr,
        config.storage.root.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => error!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
