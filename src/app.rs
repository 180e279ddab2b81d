use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::controllers::AppState;
use crate::migrations::Migrator;
use crate::routing;
use crate::storage::LocalStorage;

/// The soundboard application.
///
/// Owns the configuration and the database handle; construction connects
/// and migrates, [`close`](Self::close) tears the pool down explicitly.
pub struct App {
    pub config: Config,
    pub db: DatabaseConnection,
}

impl App {
    /// Create the application from environment configuration.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env()?;
        Self::with_config(config).await
    }

    /// Create the application with a given config.
    pub async fn with_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let db = crate::db::connect(&config).await?;

        // Check for CLI database operations (--migrate, --rollback) and exit if present
        Self::handle_db_cli_args(&db).await?;

        // Run pending migrations on startup. A database that is down at
        // this point only costs the requests that need it; the server
        // still comes up.
        match Migrator::up(&db, None).await {
            Ok(()) => tracing::info!("Migrations complete."),
            Err(err) => {
                tracing::error!(error = %err, "database unavailable at startup; continuing")
            }
        }

        Ok(App { config, db })
    }

    /// Handle CLI database operations passed as command-line arguments.
    /// If --migrate or --rollback is detected, perform the operation and exit the process.
    async fn handle_db_cli_args(db: &DatabaseConnection) -> Result<(), Box<dyn std::error::Error>> {
        let args: Vec<String> = std::env::args().collect();

        if args.contains(&"--migrate".to_string()) {
            tracing::info!("Running pending database migrations...");
            Migrator::up(db, None).await?;
            tracing::info!("Migrations complete.");
            std::process::exit(0);
        }

        if let Some(pos) = args.iter().position(|arg| arg == "--rollback") {
            let steps = if pos + 1 < args.len() {
                args[pos + 1].parse::<u32>().unwrap_or(1)
            } else {
                1
            };
            tracing::info!("Rolling back {} migration(s)...", steps);
            Migrator::down(db, Some(steps)).await?;
            tracing::info!("Rollback complete.");
            std::process::exit(0);
        }

        Ok(())
    }

    /// Build the Axum router with all routes, state, and middleware.
    pub fn router(&self) -> Router {
        let is_dev = self.config.is_dev();

        let state = AppState {
            db: self.db.clone(),
            config: Arc::new(self.config.clone()),
            storage: LocalStorage::new(&self.config.upload_dir),
        };

        let mut router = routing::build_routes(&self.config)
            .with_state(state)
            // uploads plus some slack for the other multipart fields
            .layer(DefaultBodyLimit::max(
                self.config.max_upload_size as usize + 64 * 1024,
            ));

        // Only add tracing/request-id middleware in development mode.
        if is_dev {
            use tower_http::trace::DefaultMakeSpan;
            use tower_http::trace::DefaultOnRequest;
            use tower_http::trace::DefaultOnResponse;
            use tower_http::LatencyUnit;

            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                );
        }

        router
    }

    /// Run the application server until ctrl-c, then close the pool.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.server_addr();
        let router = self.router();

        println!("\n🎵 Soundboard is running!");
        println!("   → Server: http://{}", addr);
        println!();

        tracing::info!("Soundboard server running on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.close().await?;
        Ok(())
    }

    /// Tear down the database pool.
    pub async fn close(self) -> Result<(), sea_orm::DbErr> {
        self.db.close().await
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutting down soundboard server...");
}
