//! HTTP server for the devlink API.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::db::Database;
use crate::{DevlinkError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// API server.
pub struct ApiServer {
    addr: SocketAddr,
    state: AppState,
    cors_origins: Vec<String>,
}

impl ApiServer {
    /// Create a new API server from configuration.
    pub fn new(config: &Config, db: Database) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| DevlinkError::Config(format!("invalid server address: {e}")))?;

        let state = AppState::new(db, &config.auth)?;

        Ok(Self {
            addr,
            state,
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// Run the server until the process is stopped.
    pub async fn run(self) -> Result<()> {
        let router = create_router(self.state, &self.cors_origins);

        let listener = TcpListener::bind(self.addr).await?;
        info!("API server listening on {}", self.addr);

        axum::serve(listener, router)
            .await
            .map_err(|e| DevlinkError::Io(e.into()))?;

        Ok(())
    }
}
