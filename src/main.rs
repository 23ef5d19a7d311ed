use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, http::StatusCode};
use tower::{BoxError, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};

use calendar_invite_service::providers::{CalendarSource, InviteSink, TaskSource};
use calendar_invite_service::services::ledger::create_ledger_service;
use calendar_invite_service::{
    create_router, AppState, CalendarClient, CloseCrmClient, RunConfig, Template,
};

// Error handler
async fn handle_error(error: BoxError) -> (StatusCode, String) {
    if error.is::<tokio::time::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            "Request took too long".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", error),
        )
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    // Initialize the collaborator clients
    let crm_client = Arc::new(CloseCrmClient::from_env());
    let calendar_client = Arc::new(CalendarClient::from_env());

    // Initialize the issuance ledger
    let ledger = create_ledger_service();
    info!("Invite ledger initialized");

    // Seed the run defaults from environment, falling back to the stock
    // config (30-minute meetings, one lead per block, "Blind Invite").
    let mut config = RunConfig::default();

    if let Ok(value) = env::var("DEFAULT_MEETING_LENGTH_MINUTES") {
        config.meeting_length_minutes = value
            .parse()
            .expect("DEFAULT_MEETING_LENGTH_MINUTES must be a number");
    }
    if let Ok(value) = env::var("DEFAULT_LEADS_PER_BLOCK") {
        config.leads_per_block = value
            .parse()
            .expect("DEFAULT_LEADS_PER_BLOCK must be a number");
    }
    if let Ok(value) = env::var("DEFAULT_BLOCK_QUERY") {
        config.block_query = value;
    }

    if let Err(reason) = config.validate() {
        panic!("Invalid default run config: {}", reason);
    }

    info!(
        "Run defaults: {} minute meetings, {} lead(s) per block, block query '{}'",
        config.meeting_length_minutes, config.leads_per_block, config.block_query
    );

    // Check if running in production mode
    let is_production = env::var("ENVIRONMENT")
        .map(|val| val.to_lowercase() == "production")
        .unwrap_or(false);

    if is_production {
        info!("Running in PRODUCTION mode - restricting available endpoints");
    } else {
        info!("Running in DEVELOPMENT mode - all endpoints will be available");
    }

    // Create shared application state; the invite template starts empty and
    // is set by the operator before issuance.
    let task_source: Arc<dyn TaskSource> = crm_client;
    let calendar_source: Arc<dyn CalendarSource> = calendar_client.clone();
    let invite_sink: Arc<dyn InviteSink> = calendar_client;

    let app_state = Arc::new(AppState::new(
        task_source,
        calendar_source,
        invite_sink,
        ledger,
        config,
        Template::default(),
    ));

    // Create router with appropriate routes based on environment
    let app = create_router(app_state, is_production).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .load_shed()
            .concurrency_limit(64)
            .timeout(Duration::from_secs(30))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any)),
    );

    // Bind to port 3000
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    // Set up signal handler for graceful shutdown
    let shutdown = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received interrupt signal, starting graceful shutdown");
            },
            _ = terminate => {
                info!("Received terminate signal, starting graceful shutdown");
            },
        }
    };

    // Start server with graceful shutdown
    info!("Server is ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .expect("Failed to start server");

    info!("Server has been gracefully shut down");
}
