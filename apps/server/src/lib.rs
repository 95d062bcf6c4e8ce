//! # NinjaERP Server
//!
//! The core HTTP service: welcome and health endpoints plus interactive API
//! documentation, served by `Axum` on top of a `PostgreSQL` connection pool.
//!
//! ## Example
//! ```no_run
//! use ninja_kernel::config::load_settings;
//! use ninja_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .settings(load_settings()?)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use ninja_database::Database;
use ninja_kernel::domain::config::Settings;
use ninja_kernel::server::AppState;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

/// Time in-flight requests get to complete after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    settings: Settings,
    database: Option<Database>,
}

impl ServerBuilder {
    /// Sets the process settings.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Uses an existing pool instead of connecting with `DATABASE_URL`.
    pub fn database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    async fn init_database(&self) -> Result<Database> {
        Database::builder()
            .with_settings(&self.settings)
            .connect()
            .await
            .context("Failed to establish database connection")
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Connects the pool (unless one was supplied) and verifies the server answers
    /// 2. Constructs application state
    /// 3. Builds the router: system routes, API docs, CORS and request tracing
    ///
    /// # Errors
    /// Returns an error if:
    /// * The database stays unreachable after the startup retries
    /// * The configured domain cannot form a CORS origin
    pub async fn build(self) -> Result<Server> {
        let database = match &self.database {
            Some(database) => database.clone(),
            None => self.init_database().await?,
        };

        let state = AppState::builder()
            .settings(self.settings)
            .database(database)
            .build()
            .context("Failed to finalize application state")?;

        let router = router::init(state.clone()).context("Failed to build router")?;

        Ok(Server { state, router })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: AppState,
    router: Router,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Starts the server and runs until a shutdown signal is received, then closes
    /// the database pool.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address.
    pub async fn run(self) -> Result<()> {
        let settings = &self.state.settings;
        let address = SocketAddr::new(settings.bind_address, settings.port);

        info!(
            address = %address,
            environment = %settings.environment,
            debug = settings.debug,
            "Starting server"
        );

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        info!("Listening on http://{address}");
        let served = axum_server::bind(address)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await
            .context("HTTP server failed");

        self.state.database.close().await;
        info!("Server shutdown complete");
        served
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// A clone of the fully layered router, for in-process requests.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
