use chrono::Utc;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

use crate::models::calendar::Assignment;

// One row per created invite. Audit trail only; the in-memory run state
// stays the source of truth for resume decisions within a run.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IssuedRecord {
    pub task_id: String,
    pub lead_id: String,
    pub company_name: String,
    pub contact_email: String,
    pub invite_id: String,
    pub slot_start: String, // ISO format
    pub slot_end: String,   // ISO format
    pub block_label: String,
    pub status: String, // "issued" or "completion_pending"
    pub created_at: String, // ISO format
}

// Append-only CSV ledger of issued invites.
pub struct LedgerService {
    csv_path: String,
    file_mutex: Mutex<()>,
}

impl LedgerService {
    pub fn new(csv_path: &str) -> Self {
        // Create the CSV file if it doesn't exist with proper headers
        if !Path::new(csv_path).exists() {
            info!("Creating new invite ledger file at {}", csv_path);

            let file = File::create(csv_path).unwrap_or_else(|e| {
                error!("Failed to create ledger file: {}", e);
                panic!("Failed to create ledger file: {}", e)
            });

            let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

            if let Err(e) = writer.write_record([
                "task_id",
                "lead_id",
                "company_name",
                "contact_email",
                "invite_id",
                "slot_start",
                "slot_end",
                "block_label",
                "status",
                "created_at",
            ]) {
                error!("Failed to write ledger headers: {}", e);
                panic!("Failed to write ledger headers: {}", e);
            }

            if let Err(e) = writer.flush() {
                error!("Failed to flush ledger headers: {}", e);
                panic!("Failed to flush ledger headers: {}", e);
            }
        }

        Self {
            csv_path: csv_path.to_string(),
            file_mutex: Mutex::new(()),
        }
    }

    /// Record one created invite. Inserting the same task with the same
    /// status twice is a no-op, so a retried pass cannot duplicate rows.
    pub fn record_issued(
        &self,
        assignment: &Assignment,
        invite_id: &str,
        status: &str,
    ) -> Result<(), String> {
        let is_duplicate = self
            .find_by_task_id(&assignment.task.id)?
            .into_iter()
            .any(|record| record.status == status);

        if is_duplicate {
            info!(
                "Ledger already holds a '{}' record for task {}, skipping insertion",
                status, assignment.task.id
            );
            return Ok(());
        }

        let record = IssuedRecord {
            task_id: assignment.task.id.clone(),
            lead_id: assignment.task.lead_id.clone(),
            company_name: assignment.task.company_name.clone(),
            contact_email: assignment.task.contact_email.clone(),
            invite_id: invite_id.to_string(),
            slot_start: assignment.slot.start_time.to_rfc3339(),
            slot_end: assignment.slot.end_time.to_rfc3339(),
            block_label: assignment.block_label.clone(),
            status: status.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        self.write_record(&record)
    }

    /// All ledger rows for one task id.
    pub fn find_by_task_id(&self, task_id: &str) -> Result<Vec<IssuedRecord>, String> {
        let _lock = self
            .file_mutex
            .lock()
            .map_err(|e| format!("Failed to acquire mutex: {}", e))?;

        let file = File::open(&self.csv_path)
            .map_err(|e| format!("Failed to open ledger file: {}", e))?;

        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let mut records = Vec::new();
        for result in reader.deserialize::<IssuedRecord>() {
            let record = result.map_err(|e| format!("Failed to parse ledger record: {}", e))?;
            if record.task_id == task_id {
                records.push(record);
            }
        }

        Ok(records)
    }

    // Helper to append a record to the CSV
    fn write_record(&self, record: &IssuedRecord) -> Result<(), String> {
        let _lock = self
            .file_mutex
            .lock()
            .map_err(|e| format!("Failed to acquire mutex: {}", e))?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .map_err(|e| format!("Failed to open ledger file: {}", e))?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        writer
            .serialize(record)
            .map_err(|e| format!("Failed to serialize ledger record: {}", e))?;

        writer
            .flush()
            .map_err(|e| format!("Failed to flush ledger writer: {}", e))?;

        info!(
            "Recorded invite {} for task {} in ledger",
            record.invite_id, record.task_id
        );

        Ok(())
    }
}

// Create a singleton ledger service
pub fn create_ledger_service() -> Arc<LedgerService> {
    // Default path with environment variable override
    let default_path = "/app/data/invites.csv";
    let csv_path = std::env::var("LEDGER_CSV_PATH").unwrap_or_else(|_| default_path.to_string());

    // Create the data directory if it doesn't exist and we're using the default path
    if csv_path == default_path {
        let dir = std::path::Path::new(default_path).parent().unwrap();
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::error!("Failed to create data directory: {}", e);
            panic!("Failed to create data directory: {}", e);
        }
    }

    Arc::new(LedgerService::new(&csv_path))
}
