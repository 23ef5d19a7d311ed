use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::models::calendar::Assignment;
use crate::models::run::{IssueOutcome, IssueReport, Template};
use crate::providers::{InviteRequest, InviteSink, TaskSource};
use crate::services::ledger::LedgerService;
use crate::services::run::{RunError, RunState};
use crate::services::template::render_invite;

#[derive(Error, Debug)]
pub enum IssueError {
    /// The template is missing a title or body at issuance time. Fatal for
    /// this issuance call only; the run state is untouched.
    #[error("invite template is incomplete: {0}")]
    ConfigurationInvalid(&'static str),
    #[error(transparent)]
    Run(#[from] RunError),
}

/// Issue one assignment: render the invite, create it, then mark the
/// source task complete. The two side effects are strictly ordered and
/// their failures are kept apart: a failed creation leaves the lead
/// pending and never reaches the completion call, while a failed
/// completion after a sent invite is a distinct warning outcome.
pub async fn issue_assignment(
    invites: &dyn InviteSink,
    tasks: &dyn TaskSource,
    assignment: &Assignment,
    template: &Template,
) -> IssueOutcome {
    let (title, body) = render_invite(template, &assignment.task);

    let request = InviteRequest {
        title,
        body,
        start_time: assignment.slot.start_time,
        end_time: assignment.slot.end_time,
        attendee_email: assignment.task.contact_email.clone(),
    };

    info!(
        "Creating invite for task {} ({}) in block '{}' at {} - {}",
        assignment.task.id,
        assignment.task.contact_email,
        assignment.block_label,
        assignment.slot.start_time,
        assignment.slot.end_time
    );

    let invite_id = match invites.create_invite(&request).await {
        Ok(id) => id,
        Err(err) => {
            error!(
                "Failed to create invite for task {} in block '{}': {}",
                assignment.task.id, assignment.block_label, err
            );
            return IssueOutcome::InviteFailed {
                task_id: assignment.task.id.clone(),
                block_label: assignment.block_label.clone(),
                slot_start: assignment.slot.start_time,
                slot_end: assignment.slot.end_time,
                error: err.to_string(),
            };
        }
    };

    match tasks.complete(&assignment.task.id).await {
        Ok(()) => {
            info!(
                "Issued invite {} and completed task {}",
                invite_id, assignment.task.id
            );
            IssueOutcome::Issued {
                task_id: assignment.task.id.clone(),
                invite_id,
                slot_start: assignment.slot.start_time,
                slot_end: assignment.slot.end_time,
            }
        }
        Err(err) => {
            // The invite is already out; never treat this as a plain
            // failure or a naive retry would double-send.
            warn!(
                "Invite {} sent but completing task {} failed: {}",
                invite_id, assignment.task.id, err
            );
            IssueOutcome::CompletionPending {
                task_id: assignment.task.id.clone(),
                invite_id,
                error: err.to_string(),
            }
        }
    }
}

/// Walk the slot plan in packing order and issue every lead that is still
/// pending. Plan entries whose lead already left the pending set are
/// skipped, so re-entry after a partial pass never double-books. One
/// lead's failure does not stop the leads after it.
pub async fn issue_pending(
    invites: &dyn InviteSink,
    tasks: &dyn TaskSource,
    ledger: &LedgerService,
    state: &mut RunState,
) -> Result<IssueReport, IssueError> {
    if state.template.title.trim().is_empty() {
        return Err(IssueError::ConfigurationInvalid("title template is empty"));
    }
    if state.template.body.trim().is_empty() {
        return Err(IssueError::ConfigurationInvalid("body template is empty"));
    }

    state.begin_issuing()?;

    let plan = state.plan.clone();
    let template = state.template.clone();
    let mut outcomes = Vec::new();
    let mut attempted = 0;

    for assignment in &plan {
        if !state.is_pending(&assignment.task.id) {
            debug!(
                "Task {} is no longer pending, skipping its assignment",
                assignment.task.id
            );
            continue;
        }

        attempted += 1;
        let outcome = issue_assignment(invites, tasks, assignment, &template).await;

        match &outcome {
            IssueOutcome::Issued {
                task_id, invite_id, ..
            } => {
                state.remove_pending(task_id);
                if let Err(e) = ledger.record_issued(assignment, invite_id, "issued") {
                    error!("Failed to record invite in ledger: {}", e);
                    // Continue processing even if ledger storage fails
                }
            }
            IssueOutcome::CompletionPending {
                task_id,
                invite_id,
                error,
            } => {
                state.park_for_completion(task_id, invite_id, error.clone());
                if let Err(e) = ledger.record_issued(assignment, invite_id, "completion_pending") {
                    error!("Failed to record invite in ledger: {}", e);
                }
            }
            IssueOutcome::InviteFailed { .. } => {
                // Lead stays pending for the next pass.
            }
        }

        outcomes.push(outcome);
    }

    state.finish_issuing();

    let issued = outcomes
        .iter()
        .filter(|o| matches!(o, IssueOutcome::Issued { .. }))
        .count();
    let invite_failures = outcomes
        .iter()
        .filter(|o| matches!(o, IssueOutcome::InviteFailed { .. }))
        .count();
    let completion_pending = outcomes
        .iter()
        .filter(|o| matches!(o, IssueOutcome::CompletionPending { .. }))
        .count();

    info!(
        "Issuance pass finished: {} attempted, {} issued, {} invite failure(s), {} awaiting completion",
        attempted, issued, invite_failures, completion_pending
    );

    Ok(IssueReport {
        attempted,
        issued,
        invite_failures,
        completion_pending,
        outcomes,
    })
}
