use std::sync::Arc;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use coinscope::{
    app_router, AppState, CoinGeckoProvider, CronScheduler, IngestionService, MarketStore,
    PostgresClient, QueryService, Settings,
};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let settings = Settings::new()
        .context("Failed to load configuration. Please ensure DATABASE_URL and CG_API_KEY are set")?;

    SimpleLogger::new()
        .with_level(settings.logging.level_filter())
        .init()?;

    let postgres = PostgresClient::new(&settings.database_url, &settings.postgres)
        .await
        .context("Failed to initialize database connection")?;
    postgres.migrate().await?;

    let store: Arc<dyn MarketStore> = Arc::new(postgres);
    let provider = Arc::new(
        CoinGeckoProvider::new(settings.cg_api_key.clone(), &settings.provider)
            .context("Failed to build CoinGecko client")?,
    );

    let ingestion = IngestionService::new(provider, store.clone());
    let queries = QueryService::new(store);

    run_server(settings, ingestion, queries).await
}

async fn run_server(
    settings: Settings,
    ingestion: IngestionService,
    queries: QueryService,
) -> anyhow::Result<()> {
    let cancellation_token = CancellationToken::new();

    // Create and spawn cron scheduler for background jobs
    let cron_scheduler = CronScheduler::new(ingestion.clone(), settings.cron.clone());

    let cron_token = cancellation_token.child_token();
    let cron_handle = tokio::spawn(async move {
        if let Err(e) = cron_scheduler.run(cron_token).await {
            error!("Cron scheduler failed: {:#}", e);
        }
    });

    let state = Arc::new(AppState { ingestion, queries });
    let router = app_router(state, &settings.server);

    let listener = tokio::net::TcpListener::bind(settings.server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server.listen_addr))?;
    info!("Listening on {}", settings.server.listen_addr);

    let server_token = cancellation_token.child_token();
    let server_handle = tokio::spawn(async move {
        let shutdown = async move { server_token.cancelled().await };
        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
        {
            error!("HTTP server failed: {:#}", e);
        }
    });

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Service running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
        };
    }

    // Cancel all running tasks
    cancellation_token.cancel();

    info!("Waiting for HTTP server to drain...");
    let _ = server_handle.await;

    info!("Waiting for cron scheduler to stop...");
    let _ = cron_handle.await;

    info!("Shutdown complete");
    Ok(())
}
