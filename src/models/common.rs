use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::calendar::{Assignment, CalendarBlock};
use crate::models::run::{IssueReport, RunConfig, RunPhase, Template};

// Request body for the task search endpoint.
#[derive(Debug, Deserialize, Serialize)]
pub struct SearchRequest {
    pub query: String,
}

// Response for the task search endpoint.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub message: String,
    pub phase: RunPhase,
    pub pending_count: usize,
    pub skipped_no_email: usize,
    pub skipped_awaiting_completion: usize,
}

// Response for config and template updates.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub message: String,
    pub phase: RunPhase,
}

// One planned slot binding, as shown to the operator.
#[derive(Debug, Serialize)]
pub struct PlannedAssignment {
    pub task_id: String,
    pub company_name: String,
    pub contact_email: String,
    pub block_label: String,
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
}

impl From<&Assignment> for PlannedAssignment {
    fn from(assignment: &Assignment) -> Self {
        Self {
            task_id: assignment.task.id.clone(),
            company_name: assignment.task.company_name.clone(),
            contact_email: assignment.task.contact_email.clone(),
            block_label: assignment.block_label.clone(),
            slot_start: assignment.slot.start_time,
            slot_end: assignment.slot.end_time,
        }
    }
}

// A block window reported back on validation failures.
#[derive(Debug, Serialize)]
pub struct BlockWindow {
    pub summary: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl From<&CalendarBlock> for BlockWindow {
    fn from(block: &CalendarBlock) -> Self {
        Self {
            summary: block.summary.clone(),
            start_time: block.start_time,
            end_time: block.end_time,
            duration_minutes: block.duration_minutes(),
        }
    }
}

// Response for the capacity validation endpoint.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub success: bool,
    pub message: String,
    pub phase: RunPhase,
    pub error_kind: Option<String>,
    pub usable_blocks: usize,
    pub total_minutes: i64,
    pub required_minutes: f64,
    pub undersized_blocks: Vec<BlockWindow>,
    pub plan: Vec<PlannedAssignment>,
}

// Response for the issuance endpoint.
#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub success: bool,
    pub message: String,
    pub phase: RunPhase,
    pub report: IssueReport,
}

// A lead parked after its invite went out but the completion call failed.
#[derive(Debug, Serialize)]
pub struct CompletionHoldSummary {
    pub task_id: String,
    pub lead_id: String,
    pub contact_email: String,
    pub invite_id: String,
    pub error: String,
}

// Full run snapshot for the status endpoint.
#[derive(Debug, Serialize)]
pub struct RunStatusResponse {
    pub phase: RunPhase,
    pub config: RunConfig,
    pub template: Template,
    pub pending_count: usize,
    pub pending_task_ids: Vec<String>,
    pub plan: Vec<PlannedAssignment>,
    pub awaiting_completion: Vec<CompletionHoldSummary>,
}
