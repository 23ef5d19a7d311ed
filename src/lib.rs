//! Calendar Invite Automation Service
//!
//! This library automates booking placeholder calendar blocks with leads
//! pulled from a CRM. Pending lead tasks are packed into back-to-back
//! meeting slots carved out of operator-created placeholder blocks, each
//! lead gets a personalized invite rendered from a shared template, and
//! send/completion state is tracked so a partially-completed run can
//! resume without double-sending.
//!
//! # Modules
//!
//! - `providers`: collaborator seams (task source, calendar source, invite sink)
//! - `client`: CRM client for task search, lead enrichment, and completion
//! - `calendar`: calendar client for block search and invite creation
//! - `services`: the run workflow (capacity check, slot packing, template
//!   rendering, issuance, run state machine, issuance ledger)
//! - `handlers` / `routes`: the axum command surface driving a run

pub mod auth;
pub mod calendar;
pub mod client;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod routes;
pub mod services;

#[cfg(test)]
pub mod client_mock;

// Re-export the main API types for ease of use
pub use calendar::CalendarClient;
pub use client::CloseCrmClient;
pub use handlers::api::AppState;
pub use models::run::{RunConfig, Template};
pub use routes::create_router;
