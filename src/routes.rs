use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::api::{
    issue_invites, run_status, search_tasks, update_config, update_template, validate_capacity,
    AppState,
};
use crate::handlers::test::{health_check, sample_run_setup};

pub fn create_router(app_state: Arc<AppState>, is_production: bool) -> Router {
    let mut router = Router::new();

    // Health check is always available
    let health_route = Router::new().route("/health", get(health_check));
    router = router.merge(health_route);

    // Run workflow endpoints are always available
    let run_routes = Router::new()
        .route("/run", get(run_status))
        .route("/run/search", post(search_tasks))
        .route("/run/config", post(update_config))
        .route("/run/template", post(update_template))
        .route("/run/validate", post(validate_capacity))
        .route("/run/issue", post(issue_invites));
    router = router.merge(run_routes);

    // Only add sample payload routes if not in production mode
    if !is_production {
        let sample_routes = Router::new().route("/test/sample-run", get(sample_run_setup));
        router = router.merge(sample_routes);

        info!("Sample payload routes enabled - server running in development mode");
    } else {
        info!("Running in production mode - only run workflow and health endpoints exposed");
    }

    router.with_state(app_state)
}
