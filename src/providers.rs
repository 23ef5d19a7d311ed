//! Collaborator seams for the run workflow.
//!
//! The core only ever talks to the CRM, the calendar, and the invite
//! backend through these traits, so tests can swap in mocks and the
//! concrete clients stay interchangeable.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::calendar::CalendarBlock;
use crate::models::task::LeadTask;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

// Everything the invite backend needs to create one invite. The organizer
// identity belongs to the sink implementation, not the request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InviteRequest {
    pub title: String,
    pub body: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attendee_email: String,
}

/// Source of pending lead tasks.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Find incomplete lead tasks whose description contains the query.
    async fn search(&self, query: &str) -> Result<Vec<LeadTask>, ProviderError>;

    /// Fill company and contact fields from the owning lead record.
    async fn enrich(&self, task: LeadTask) -> Result<LeadTask, ProviderError>;

    /// Mark the originating task complete.
    async fn complete(&self, task_id: &str) -> Result<(), ProviderError>;
}

/// Source of placeholder calendar blocks.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Future-dated blocks matching a name filter, ordered by start time.
    async fn find_blocks(&self, label_query: &str) -> Result<Vec<CalendarBlock>, ProviderError>;
}

/// Destination for rendered invites.
#[async_trait]
pub trait InviteSink: Send + Sync {
    /// Create the invite and return its identifier.
    async fn create_invite(&self, request: &InviteRequest) -> Result<String, ProviderError>;
}
