//! Server initialization and startup logic for the NAS panel.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use naspanel_api::{ApiConfig, ApiServer, AppState, AuthGate};
use naspanel_config::{Config, ConfigValidator, LoggingConfig};
use naspanel_cron::{CronGrammar, CronJobService, CronServiceConfig, FileJobStore, SystemClock};
use naspanel_exec::ShellRunner;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize tracing with console output and an optional daily log file.
///
/// `RUST_LOG` takes precedence over the configured level.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    layers.push(if logging.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).with_ansi(true).boxed()
    });

    if let Some(dir) = &logging.directory {
        std::fs::create_dir_all(dir)?;
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("naspanel")
            .filename_suffix("log")
            .max_log_files(30)
            .build(dir)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // The worker flushes until its guard drops; keep it for the whole process.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        layers.push(if logging.json {
            fmt::layer().json().with_writer(non_blocking).boxed()
        } else {
            fmt::layer().with_writer(non_blocking).with_ansi(false).boxed()
        });
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

/// Run the server in foreground until Ctrl-C or SIGTERM.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting NAS panel v{}", env!("CARGO_PKG_VERSION"));

    let validation = ConfigValidator::validate(&config)?;
    for warning in &validation.warnings {
        warn!("Config warning at {}: {}", warning.path, warning.message);
    }
    if !validation.is_valid() {
        for err in &validation.errors {
            error!("Config error at {}: {}", err.path, err.message);
        }
        return Err("invalid configuration".into());
    }

    let grammar = CronGrammar::from_timezone_name(&config.cron.timezone)?;
    info!(
        "Cron jobs file: {}, time zone: {}",
        config.cron.jobs_file.display(),
        grammar.timezone()
    );

    let cron = Arc::new(CronJobService::new(
        Arc::new(FileJobStore::new(&config.cron.jobs_file)),
        Arc::new(ShellRunner::with_shell(&config.cron.shell)),
        Arc::new(grammar),
        Arc::new(SystemClock),
        CronServiceConfig {
            command_timeout: Duration::from_millis(config.cron.command_timeout_ms),
            queue_capacity: config.cron.queue_capacity,
        },
    ));
    let report = cron.start().await?;
    info!(
        "Cron service started: {} jobs armed, {} skipped",
        report.armed,
        report.skipped.len()
    );

    let auth = if config.auth.enabled {
        AuthGate::new(config.auth.tokens.clone())
    } else {
        warn!("Authentication is disabled; the API is open to anyone who can reach it");
        AuthGate::disabled()
    };

    let state = Arc::new(AppState::new(cron.clone(), auth));
    let server = ApiServer::new(
        ApiConfig::new(config.server.host.clone(), config.server.port),
        state,
    );

    let result = server.run_until(shutdown_signal()).await;
    cron.shutdown();
    result
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
