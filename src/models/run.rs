use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Meeting lengths the operator can pick from, in minutes.
pub const ALLOWED_MEETING_LENGTHS: [i64; 5] = [15, 20, 30, 45, 60];

// Run-wide knobs. Changing any field invalidates a prior capacity check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub meeting_length_minutes: i64,
    pub leads_per_block: u32,
    pub block_query: String,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !ALLOWED_MEETING_LENGTHS.contains(&self.meeting_length_minutes) {
            return Err(format!(
                "meeting_length_minutes must be one of {:?}, got {}",
                ALLOWED_MEETING_LENGTHS, self.meeting_length_minutes
            ));
        }
        if self.leads_per_block == 0 {
            return Err("leads_per_block must be at least 1".to_string());
        }
        if self.block_query.trim().is_empty() {
            return Err("block_query must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            meeting_length_minutes: 30,
            leads_per_block: 1,
            block_query: "Blind Invite".to_string(),
        }
    }
}

// Invite title and body, each carrying zero or more of the placeholder
// tokens {{first_name}}, {{last_name}}, {{last_initial}}, {{company}}.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub title: String,
    pub body: String,
}

// Workflow phases of a single run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Searched,
    CapacityChecked,
    Ready,
    Issuing,
    Completed,
}

// Per-assignment result of one issuance attempt.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IssueOutcome {
    /// Invite created and the source task marked complete.
    Issued {
        task_id: String,
        invite_id: String,
        slot_start: DateTime<Utc>,
        slot_end: DateTime<Utc>,
    },
    /// Invite creation failed; the lead stays pending and the completion
    /// call was never attempted.
    InviteFailed {
        task_id: String,
        block_label: String,
        slot_start: DateTime<Utc>,
        slot_end: DateTime<Utc>,
        error: String,
    },
    /// Invite was sent but marking the source task complete failed. The
    /// lead is parked for manual completion and never re-sent.
    CompletionPending {
        task_id: String,
        invite_id: String,
        error: String,
    },
}

// Summary of one issuance pass over the plan.
#[derive(Debug, Serialize)]
pub struct IssueReport {
    pub attempted: usize,
    pub issued: usize,
    pub invite_failures: usize,
    pub completion_pending: usize,
    pub outcomes: Vec<IssueOutcome>,
}
