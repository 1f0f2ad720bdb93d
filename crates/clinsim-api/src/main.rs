//! Clinical case simulator API server entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clinsim_api::config::{AppConfig, LogFormat};
use clinsim_api::error::AppError;
use clinsim_api::routes;
use clinsim_api::state::AppState;
use clinsim_cases::CaseCatalog;
use clinsim_core::clock::SystemClock;
use clinsim_event_store::InMemoryEventRepository;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .init(),
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        cases_path = %config.cases_path.display(),
        strict_load = config.strict_load,
        "Starting clinical case simulator API server"
    );

    // Load the case table before accepting requests; a missing or unreadable
    // source is fatal.
    let catalog = Arc::new(CaseCatalog::new(config.strict_load));
    let table = catalog.get_or_load(&config.cases_path)?;
    tracing::info!(
        cases = table.list_cases().len(),
        steps = table.step_count(),
        "Case table ready"
    );

    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(InMemoryEventRepository::new()),
        catalog,
        config.cases_path.clone(),
    );

    let app = routes::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = AppConfig::from_env();
    init_tracing(config.as_ref().map_or(LogFormat::default(), |c| c.log_format));

    match config {
        Ok(config) => match run(config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!(error = %err, "server terminated");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            ExitCode::FAILURE
        }
    }
}
