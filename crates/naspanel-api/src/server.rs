//! HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::routes::create_router;
use crate::state::AppState;

/// Listen address.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl ApiConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// The panel's HTTP server.
pub struct ApiServer {
    config: ApiConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Serve until `shutdown` resolves, then drain open connections.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_router(self.state.clone());

        let addr: SocketAddr = self.addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("NAS panel API listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("NAS panel API stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthGate;
    use naspanel_cron::{
        CronGrammar, CronJobService, CronServiceConfig, MemoryJobStore, SystemClock,
    };
    use naspanel_exec::ShellRunner;

    fn test_state() -> Arc<AppState> {
        let cron = Arc::new(CronJobService::new(
            Arc::new(MemoryJobStore::new()),
            Arc::new(ShellRunner::new()),
            Arc::new(CronGrammar::default()),
            Arc::new(SystemClock),
            CronServiceConfig::default(),
        ));
        Arc::new(AppState::new(cron, AuthGate::disabled()))
    }

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_server_addr_format() {
        let server = ApiServer::new(ApiConfig::new("0.0.0.0", 9443), test_state());
        assert_eq!(server.addr(), "0.0.0.0:9443");
    }

    #[tokio::test]
    async fn test_run_until_stops_on_signal() {
        let server = ApiServer::new(ApiConfig::new("127.0.0.1", 0), test_state());
        server.run_until(async {}).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_rejects_bad_host() {
        let server = ApiServer::new(ApiConfig::new("not an address", 80), test_state());
        assert!(server.run_until(async {}).await.is_err());
    }
}
