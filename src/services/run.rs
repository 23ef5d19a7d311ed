use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::calendar::Assignment;
use crate::models::run::{RunConfig, RunPhase, Template};
use crate::models::task::LeadTask;

#[derive(Error, Debug, PartialEq)]
pub enum RunError {
    #[error("{command} is not valid while the run is in phase {phase:?}")]
    InvalidPhase {
        command: &'static str,
        phase: RunPhase,
    },
}

// A lead whose invite went out but whose completion call failed. Parked
// here so a retry pass can never send its invite again, and surfaced to
// the operator for manual completion in the CRM.
#[derive(Debug, Clone)]
pub struct CompletionHold {
    pub task: LeadTask,
    pub invite_id: String,
    pub error: String,
}

/// The whole mutable state of one run, owned by the orchestrating caller
/// and advanced only through the command methods below.
#[derive(Debug)]
pub struct RunState {
    pub phase: RunPhase,
    pub config: RunConfig,
    pub template: Template,
    pub pending: Vec<LeadTask>,
    pub plan: Vec<Assignment>,
    pub awaiting_completion: Vec<CompletionHold>,
}

impl RunState {
    pub fn new(config: RunConfig, template: Template) -> Self {
        Self {
            phase: RunPhase::Idle,
            config,
            template,
            pending: Vec::new(),
            plan: Vec::new(),
            awaiting_completion: Vec::new(),
        }
    }

    /// Install a fresh pending set from a task search. Leads already parked
    /// for manual completion are filtered out so their invites cannot be
    /// sent twice; the count of such skips is returned.
    pub fn record_search(&mut self, tasks: Vec<LeadTask>) -> usize {
        let parked: HashSet<String> = self
            .awaiting_completion
            .iter()
            .map(|hold| hold.task.id.clone())
            .collect();

        let before = tasks.len();
        self.pending = tasks
            .into_iter()
            .filter(|task| {
                if parked.contains(&task.id) {
                    warn!(
                        "Task {} already has a sent invite awaiting manual completion, skipping",
                        task.id
                    );
                    false
                } else {
                    true
                }
            })
            .collect();

        let skipped = before - self.pending.len();
        self.plan.clear();
        self.phase = RunPhase::Searched;

        info!(
            "Search recorded: {} pending lead(s), {} skipped as awaiting completion",
            self.pending.len(),
            skipped
        );
        skipped
    }

    /// Replace the run config. Any capacity result or slot plan computed
    /// under the old config is stale, so the run drops back to Searched.
    pub fn set_config(&mut self, config: RunConfig) {
        self.config = config;
        self.invalidate_plan("config changed");
    }

    /// Replace the invite template. The slot plan itself is unchanged by a
    /// template edit, but readiness was confirmed against the old template,
    /// so the run drops back to Searched for a fresh validation pass.
    pub fn set_template(&mut self, template: Template) {
        self.template = template;
        self.invalidate_plan("template changed");
    }

    fn invalidate_plan(&mut self, reason: &str) {
        match self.phase {
            RunPhase::CapacityChecked | RunPhase::Ready | RunPhase::Issuing | RunPhase::Completed => {
                info!(
                    "Run reverted from {:?} to Searched ({}), capacity result discarded",
                    self.phase, reason
                );
                self.plan.clear();
                self.phase = RunPhase::Searched;
            }
            RunPhase::Idle | RunPhase::Searched => {
                debug!("{} with no capacity result to discard", reason);
            }
        }
    }

    /// Record a passing capacity check.
    pub fn mark_capacity_checked(&mut self) -> Result<(), RunError> {
        match self.phase {
            RunPhase::Searched | RunPhase::CapacityChecked | RunPhase::Ready => {
                self.phase = RunPhase::CapacityChecked;
                Ok(())
            }
            phase => Err(RunError::InvalidPhase {
                command: "capacity check",
                phase,
            }),
        }
    }

    /// Install the slot plan produced by the packer.
    pub fn install_plan(&mut self, plan: Vec<Assignment>) -> Result<(), RunError> {
        match self.phase {
            RunPhase::CapacityChecked => {
                debug!("Installing slot plan with {} assignment(s)", plan.len());
                self.plan = plan;
                self.phase = RunPhase::Ready;
                Ok(())
            }
            phase => Err(RunError::InvalidPhase {
                command: "plan installation",
                phase,
            }),
        }
    }

    pub fn begin_issuing(&mut self) -> Result<(), RunError> {
        match self.phase {
            RunPhase::Ready => {
                self.phase = RunPhase::Issuing;
                Ok(())
            }
            phase => Err(RunError::InvalidPhase {
                command: "issuance",
                phase,
            }),
        }
    }

    /// Close an issuance pass: the run completes when the pending set is
    /// empty, otherwise it returns to Ready so the remaining leads can be
    /// retried against the same plan.
    pub fn finish_issuing(&mut self) {
        if self.pending.is_empty() {
            info!("All pending leads processed, run completed");
            self.phase = RunPhase::Completed;
        } else {
            info!(
                "{} lead(s) still pending after issuance pass, run back to Ready",
                self.pending.len()
            );
            self.phase = RunPhase::Ready;
        }
    }

    pub fn is_pending(&self, task_id: &str) -> bool {
        self.pending.iter().any(|task| task.id == task_id)
    }

    /// Remove a lead from the pending set. Removal is the completion
    /// signal; there is no separate done flag.
    pub fn remove_pending(&mut self, task_id: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|task| task.id != task_id);
        self.pending.len() < before
    }

    /// Move a lead out of the pending set into the awaiting-completion
    /// list after its invite was sent but the completion call failed.
    pub fn park_for_completion(&mut self, task_id: &str, invite_id: &str, error: String) {
        if let Some(pos) = self.pending.iter().position(|task| task.id == task_id) {
            let task = self.pending.remove(pos);
            warn!(
                "Parking task {} for manual completion (invite {} already sent): {}",
                task_id, invite_id, error
            );
            self.awaiting_completion.push(CompletionHold {
                task,
                invite_id: invite_id.to_string(),
                error,
            });
        }
    }
}
