//! # DayQHI Server
//!
//! Serves the HTML shell and the AQHI alert API on `Axum`, backed by `SurrealDB` and a typed
//! event bus.
//!
//! ## Example
//! ```no_run
//! use dayqhi_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(3000)
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
use dayqhi::domain::config::ApiConfig;
use dayqhi::kernel::server::ApiState;
use dayqhi_database::Database;
use dayqhi_event_bus::EventBus;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    async fn init_database(&self) -> Result<Database> {
        let db_cfg = &self.cfg.database;
        let mut builder = Database::builder()
            .url(&db_cfg.url)
            .session(&db_cfg.namespace, &db_cfg.database)
            .migrations(dayqhi::migrations());

        if let Some(creds) = &db_cfg.credentials {
            builder = builder.auth(&creds.username, &creds.password);
        }

        builder.init().await.context("Failed to establish database connection")
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    tracing::warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Validates the TLS files, when configured
    /// 2. Connects to the database and applies every slice's migrations
    /// 3. Initializes the feature slices against a fresh event bus
    /// 4. Registers the slices on the application state
    ///
    /// # Errors
    /// Returns an error if:
    /// * SSL certificate/key files are missing
    /// * Database connection or a migration fails
    /// * A feature slice cannot be initialized
    pub async fn build(self) -> Result<Server> {
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, "Initializing server");

        let db = self.init_database().await?;
        let report = db.migration_report();
        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "Database migrations complete"
        );

        let events = EventBus::new();
        let slices =
            dayqhi::init(&self.cfg, &db, &events).context("Platform bootstrap failed")?;

        let state = ApiState::builder()
            .config(self.cfg)
            .db(db)
            .events(events)
            .register_slices(slices)
            .build()
            .context("Failed to finalize API state registry")?;

        info!(slices = ?state.slice_names().collect::<Vec<_>>(), "Feature slices registered");
        Ok(Server { state })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete application router: API, API docs and HTML shell.
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if SSL/TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        info!(address = %address, ssl = cfg.server.ssl.is_some(), "Starting server");

        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();
        let events = self.state.events.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        if let Some(ssl_config) = &cfg.server.ssl {
            info!("Starting HTTPS server on https://{address}");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app)
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Starting HTTP server on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(app)
                .await
                .context("HTTP server failed")?;
        }

        let closed = events.shutdown();
        info!(channels = closed, "Server shutdown complete");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Waits for Ctrl+C or SIGTERM.
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
