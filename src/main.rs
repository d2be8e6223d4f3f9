use std::sync::Arc;

use clap::Parser;
use tollgate::{
    AppState,
    cache::AnalyticsCacheService,
    config::TollgateConfig,
    db::DbPool,
    jobs::{self, RefreshQueue},
    observability, routes,
    services::Services,
};

/// CLI arguments for the metering backend.
#[derive(Parser, Debug)]
#[command(version, about = "Tollgate usage metering and billing analytics", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file. Without it, built-in defaults apply.
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the server (default)
    Serve,
    /// Run database migrations and exit
    ///
    /// Useful for init containers or CI/CD pipelines.
    Migrate,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TollgateConfig::from_file(path)?,
        None => TollgateConfig::default(),
    };

    observability::init_tracing(&config.logging);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => runtime.block_on(serve(config)),
        Command::Migrate => runtime.block_on(migrate(config)),
    }
}

async fn migrate(config: TollgateConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = DbPool::from_config(&config.database).await?;
    db.run_migrations().await?;
    tracing::info!("Migrations complete");
    Ok(())
}

async fn serve(config: TollgateConfig) -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(config);

    let db = Arc::new(DbPool::from_config(&config.database).await?);
    if config.database.run_migrations {
        db.run_migrations().await?;
    }

    let cache = Arc::new(AnalyticsCacheService::new(db.analytics_cache()));
    let (refresh_queue, refresh_rx) = RefreshQueue::new();
    let services = Services::new(
        db.clone(),
        cache,
        refresh_queue.clone(),
        config.analytics.max_age(),
    );

    tokio::spawn(jobs::start_refresh_worker(
        services.analytics.clone(),
        refresh_rx,
    ));
    if config.analytics.refresh_enabled {
        tokio::spawn(jobs::start_periodic_refresh_worker(
            refresh_queue,
            config.analytics.refresh_interval_secs,
        ));
    }
    tokio::spawn(jobs::start_retention_sweep_worker(
        db.clone(),
        config.analytics.clone(),
    ));

    let state = AppState {
        config: config.clone(),
        db,
        services,
    };
    let app = routes::build_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
