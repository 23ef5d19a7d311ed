use axum::{extract::Json as ExtractJson, extract::State, http::StatusCode, response::Json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::models::common::{
    CompletionHoldSummary, IssueResponse, PlannedAssignment, RunStatusResponse, SearchRequest,
    SearchResponse, UpdateResponse, ValidateResponse,
};
use crate::models::run::{RunConfig, RunPhase, Template};
use crate::providers::{CalendarSource, InviteSink, TaskSource};
use crate::services::capacity::{self, CapacityError};
use crate::services::issuance::{self, IssueError};
use crate::services::ledger::LedgerService;
use crate::services::packer;
use crate::services::run::RunState;

// AppState struct containing shared resources. The run itself sits behind
// a mutex: one active run per operator session, commands serialized.
pub struct AppState {
    pub tasks: Arc<dyn TaskSource>,
    pub calendar: Arc<dyn CalendarSource>,
    pub invites: Arc<dyn InviteSink>,
    pub ledger: Arc<LedgerService>,
    pub run: Mutex<RunState>,
}

impl AppState {
    pub fn new(
        tasks: Arc<dyn TaskSource>,
        calendar: Arc<dyn CalendarSource>,
        invites: Arc<dyn InviteSink>,
        ledger: Arc<LedgerService>,
        config: RunConfig,
        template: Template,
    ) -> Self {
        Self {
            tasks,
            calendar,
            invites,
            ledger,
            run: Mutex::new(RunState::new(config, template)),
        }
    }
}

// Run status endpoint
pub async fn run_status(State(state): State<Arc<AppState>>) -> Json<RunStatusResponse> {
    let run = state.run.lock().await;

    Json(RunStatusResponse {
        phase: run.phase,
        config: run.config.clone(),
        template: run.template.clone(),
        pending_count: run.pending.len(),
        pending_task_ids: run.pending.iter().map(|task| task.id.clone()).collect(),
        plan: run.plan.iter().map(PlannedAssignment::from).collect(),
        awaiting_completion: run
            .awaiting_completion
            .iter()
            .map(|hold| CompletionHoldSummary {
                task_id: hold.task.id.clone(),
                lead_id: hold.task.lead_id.clone(),
                contact_email: hold.task.contact_email.clone(),
                invite_id: hold.invite_id.clone(),
                error: hold.error.clone(),
            })
            .collect(),
    })
}

// Task search endpoint
pub async fn search_tasks(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<SearchRequest>,
) -> Result<Json<SearchResponse>, StatusCode> {
    if request.query.trim().is_empty() {
        warn!("Rejecting task search with empty query");
        return Err(StatusCode::BAD_REQUEST);
    }

    info!("Received task search request for '{}'", request.query);

    let found = match state.tasks.search(&request.query).await {
        Ok(tasks) => tasks,
        Err(err) => {
            error!("Failed to search tasks: {}", err);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // Enrich every task before it enters the run; a provider failure here
    // leaves the run state untouched.
    let mut enriched = Vec::with_capacity(found.len());
    for task in found {
        match state.tasks.enrich(task).await {
            Ok(task) => enriched.push(task),
            Err(err) => {
                error!("Failed to enrich task from lead record: {}", err);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }

    // Issuance requires a contact email; drop leads without one now so the
    // capacity arithmetic only counts issuable leads.
    let total = enriched.len();
    let issuable: Vec<_> = enriched
        .into_iter()
        .filter(|task| {
            if task.has_contact_email() {
                true
            } else {
                warn!(
                    "Task {} (lead {}) has no contact email, excluding from run",
                    task.id, task.lead_id
                );
                false
            }
        })
        .collect();
    let skipped_no_email = total - issuable.len();

    let mut run = state.run.lock().await;
    let skipped_awaiting = run.record_search(issuable);

    Ok(Json(SearchResponse {
        success: true,
        message: format!("Found {} pending lead(s)", run.pending.len()),
        phase: run.phase,
        pending_count: run.pending.len(),
        skipped_no_email,
        skipped_awaiting_completion: skipped_awaiting,
    }))
}

// Run config update endpoint
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    ExtractJson(config): ExtractJson<RunConfig>,
) -> Result<Json<UpdateResponse>, StatusCode> {
    if let Err(reason) = config.validate() {
        warn!("Rejecting run config update: {}", reason);
        return Err(StatusCode::BAD_REQUEST);
    }

    info!(
        "Updating run config: {} minute meetings, {} lead(s) per block, block query '{}'",
        config.meeting_length_minutes, config.leads_per_block, config.block_query
    );

    let mut run = state.run.lock().await;
    run.set_config(config);

    Ok(Json(UpdateResponse {
        success: true,
        message: "Run config updated".to_string(),
        phase: run.phase,
    }))
}

// Invite template update endpoint
pub async fn update_template(
    State(state): State<Arc<AppState>>,
    ExtractJson(template): ExtractJson<Template>,
) -> Result<Json<UpdateResponse>, StatusCode> {
    info!("Updating invite template");

    let mut run = state.run.lock().await;
    run.set_template(template);

    Ok(Json(UpdateResponse {
        success: true,
        message: "Invite template updated".to_string(),
        phase: run.phase,
    }))
}

// Capacity validation endpoint: fetches candidate blocks, checks capacity,
// and on success installs the slot plan.
pub async fn validate_capacity(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ValidateResponse>, StatusCode> {
    let mut run = state.run.lock().await;

    if run.phase == RunPhase::Idle {
        warn!("Capacity check requested before any task search");
        return Err(StatusCode::CONFLICT);
    }

    let blocks = match state.calendar.find_blocks(&run.config.block_query).await {
        Ok(blocks) => blocks,
        Err(err) => {
            error!("Failed to fetch placeholder blocks: {}", err);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    info!(
        "Validating {} block(s) against {} pending lead(s)",
        blocks.len(),
        run.pending.len()
    );

    match capacity::validate(&blocks, run.pending.len(), &run.config) {
        Ok(usable) => {
            let total_minutes: i64 = usable.iter().map(|b| b.duration_minutes()).sum();
            let required_minutes = run.pending.len() as f64
                * run.config.meeting_length_minutes as f64
                / f64::from(run.config.leads_per_block);

            if run.mark_capacity_checked().is_err() {
                // Guarded above; the only unreachable phases are Idle and
                // Issuing, and issuance holds the run lock.
                return Err(StatusCode::CONFLICT);
            }

            let plan = packer::pack(&usable, &run.pending, &run.config);
            let preview: Vec<PlannedAssignment> = plan.iter().map(PlannedAssignment::from).collect();

            if run.install_plan(plan).is_err() {
                return Err(StatusCode::CONFLICT);
            }

            Ok(Json(ValidateResponse {
                success: true,
                message: format!(
                    "{} usable block(s) with {} minutes cover all {} pending lead(s)",
                    usable.len(),
                    total_minutes,
                    run.pending.len()
                ),
                phase: run.phase,
                error_kind: None,
                usable_blocks: usable.len(),
                total_minutes,
                required_minutes,
                undersized_blocks: Vec::new(),
                plan: preview,
            }))
        }
        Err(err) => {
            // Validation failures never mutate the pending set or plan;
            // the run stays where it was so the operator can adjust.
            warn!("Capacity check failed: {}", err);

            let (kind, undersized, total, required) = match &err {
                CapacityError::InsufficientBlockDuration { blocks, .. } => (
                    "insufficient_block_duration",
                    blocks.iter().map(Into::into).collect(),
                    0,
                    0.0,
                ),
                CapacityError::InsufficientTotalCapacity {
                    required_minutes,
                    available_minutes,
                } => (
                    "insufficient_total_capacity",
                    Vec::new(),
                    *available_minutes,
                    *required_minutes,
                ),
            };

            Ok(Json(ValidateResponse {
                success: false,
                message: err.to_string(),
                phase: run.phase,
                error_kind: Some(kind.to_string()),
                usable_blocks: 0,
                total_minutes: total,
                required_minutes: required,
                undersized_blocks: undersized,
                plan: Vec::new(),
            }))
        }
    }
}

// Invite issuance endpoint: one pass over the current slot plan.
pub async fn issue_invites(
    State(state): State<Arc<AppState>>,
) -> Result<Json<IssueResponse>, StatusCode> {
    let mut run = state.run.lock().await;

    info!(
        "Received issuance request with {} pending lead(s) in phase {:?}",
        run.pending.len(),
        run.phase
    );

    let report = match issuance::issue_pending(
        state.invites.as_ref(),
        state.tasks.as_ref(),
        state.ledger.as_ref(),
        &mut run,
    )
    .await
    {
        Ok(report) => report,
        Err(IssueError::ConfigurationInvalid(reason)) => {
            warn!("Issuance rejected: {}", reason);
            return Err(StatusCode::BAD_REQUEST);
        }
        Err(IssueError::Run(err)) => {
            warn!("Issuance rejected: {}", err);
            return Err(StatusCode::CONFLICT);
        }
    };

    let message = format!(
        "Issued {} of {} attempted invite(s); {} failed, {} awaiting manual completion",
        report.issued, report.attempted, report.invite_failures, report.completion_pending
    );

    Ok(Json(IssueResponse {
        success: report.invite_failures == 0,
        message,
        phase: run.phase,
        report,
    }))
}
