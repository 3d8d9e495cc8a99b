//! Tasklane Server — collaborative todo platform.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use tasklane_core::config::AppConfig;
use tasklane_core::error::AppError;
use tasklane_realtime::connection::authenticator::WsAuthenticator;
use tasklane_realtime::engine::RealtimeEngine;
use tasklane_realtime::events::NotificationSink;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration for the current environment.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("TASKLANE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Tasklane v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = tasklane_database::connection::DatabasePool::connect(&config.database).await?;
    let db_pool = db.pool().clone();

    tracing::info!("Running database migrations...");
    tasklane_database::migration::run_migrations(&db_pool).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Repositories ─────────────────────────────────────
    let user_repo = Arc::new(tasklane_database::repositories::user::UserRepository::new(
        db_pool.clone(),
    ));
    let todo_repo = Arc::new(tasklane_database::repositories::todo::TodoRepository::new(
        db_pool.clone(),
    ));
    let attachment_repo = Arc::new(
        tasklane_database::repositories::attachment::AttachmentRepository::new(db_pool.clone()),
    );
    let notification_repo = Arc::new(
        tasklane_database::repositories::notification::NotificationRepository::new(db_pool.clone()),
    );
    let presence_repo = Arc::new(
        tasklane_database::repositories::presence::PresenceRepository::new(db_pool.clone()),
    );

    // ── Step 3: Attachment storage ───────────────────────────────
    tracing::info!("Initializing attachment storage...");
    let store = tasklane_storage::store::AttachmentStore::new(&config.storage.upload_root).await?;
    let thumbnailer = Arc::new(tasklane_storage::thumbnail::Thumbnailer::new(
        store.clone(),
        &config.storage.thumbnail_dir,
        config.storage.thumbnail_size,
    ));
    let store = Arc::new(store);
    tracing::info!("Attachment storage initialized");

    // ── Step 4: Auth system ──────────────────────────────────────
    let jwt_encoder = Arc::new(tasklane_auth::jwt::encoder::JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(tasklane_auth::jwt::decoder::JwtDecoder::new(&config.auth));

    // ── Step 5: Real-time engine ─────────────────────────────────
    tracing::info!("Initializing real-time engine...");
    let sink: Arc<dyn NotificationSink> = Arc::new(tasklane_service::PersistentSink::new(
        Arc::clone(&notification_repo),
    ));
    let realtime = Arc::new(RealtimeEngine::new(
        config.realtime.clone(),
        WsAuthenticator::new(Arc::clone(&jwt_decoder)),
        sink,
    ));
    realtime.start();
    tracing::info!("Real-time engine initialized");

    // ── Step 6: Services ─────────────────────────────────────────
    let publisher = Arc::clone(&realtime.publisher);
    let user_service = Arc::new(tasklane_service::UserService::new(
        Arc::clone(&user_repo),
        Arc::clone(&jwt_encoder),
        Arc::clone(&publisher),
        config.auth.clone(),
    ));
    let todo_service = Arc::new(tasklane_service::TodoService::new(
        Arc::clone(&todo_repo) as Arc<dyn tasklane_service::todo::TodoStore>,
        Arc::clone(&publisher),
    ));
    let attachment_service = Arc::new(tasklane_service::AttachmentService::new(
        Arc::clone(&attachment_repo),
        Arc::clone(&todo_repo),
        Arc::clone(&store),
        Arc::clone(&thumbnailer),
        Arc::clone(&publisher),
        config.storage.clone(),
    ));
    let notification_service = Arc::new(tasklane_service::NotificationService::new(
        Arc::clone(&notification_repo) as Arc<dyn tasklane_service::notification::NotificationStore>,
        Arc::clone(&publisher),
    ));
    let presence_service = Arc::new(tasklane_service::PresenceService::new(Arc::clone(
        &presence_repo,
    )));
    tracing::info!("Services initialized");

    // ── Step 7: Background worker ────────────────────────────────
    let mut scheduler = if config.worker.enabled {
        tracing::info!("Starting background worker...");

        let notification_cleanup = Arc::new(
            tasklane_worker::jobs::notification::NotificationCleanupJob::new(
                Arc::clone(&notification_repo),
                config.worker.clone(),
            ),
        );
        let presence_cleanup = Arc::new(tasklane_worker::jobs::presence::PresenceCleanupJob::new(
            Arc::clone(&presence_repo),
            config.worker.clone(),
        ));
        let due_reminder = Arc::new(tasklane_worker::jobs::reminder::DueReminderJob::new(
            Arc::clone(&todo_repo),
            Arc::clone(&publisher),
            config.worker.clone(),
        ));

        let scheduler = tasklane_worker::scheduler::CronScheduler::new(
            notification_cleanup,
            presence_cleanup,
            due_reminder,
        )
        .await?;
        scheduler.register_default_tasks().await?;
        scheduler.start().await?;

        tracing::info!("Background worker started");
        Some(scheduler)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── Step 8: HTTP server ──────────────────────────────────────
    let app_state = tasklane_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool: db_pool.clone(),
        jwt_decoder: Arc::clone(&jwt_decoder),
        realtime: Arc::clone(&realtime),
        user_service,
        todo_service,
        attachment_service,
        notification_service,
        presence_service,
    };

    let app = tasklane_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Tasklane server listening on {addr}");

    // ── Step 9: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // In-flight work gets a bounded window to drain before the pool closes.
    let grace = std::time::Duration::from_secs(config.server.shutdown_grace_seconds);
    let teardown = async {
        realtime.shutdown().await?;
        if let Some(scheduler) = scheduler.as_mut() {
            scheduler.shutdown().await?;
        }
        Ok::<(), AppError>(())
    };
    match tokio::time::timeout(grace, teardown).await {
        Ok(result) => result?,
        Err(_) => tracing::warn!(
            grace_seconds = config.server.shutdown_grace_seconds,
            "Graceful shutdown window elapsed, closing remaining resources"
        ),
    }
    db_pool.close().await;

    tracing::info!("Tasklane server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => {
                tracing::error!("Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
