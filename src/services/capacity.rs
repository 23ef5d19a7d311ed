use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::calendar::CalendarBlock;
use crate::models::run::RunConfig;

#[derive(Error, Debug, PartialEq)]
pub enum CapacityError {
    /// One or more blocks cannot hold even a single meeting. The run must
    /// not proceed to packing until the blocks are corrected, regardless of
    /// aggregate time.
    #[error("one or more blocks are shorter than the {meeting_length_minutes}-minute meeting length")]
    InsufficientBlockDuration {
        blocks: Vec<CalendarBlock>,
        meeting_length_minutes: i64,
    },
    /// The block set as a whole cannot cover all pending leads at the
    /// current config.
    #[error("blocks cover {available_minutes} minutes but {required_minutes} minutes are required")]
    InsufficientTotalCapacity {
        required_minutes: f64,
        available_minutes: i64,
    },
}

/// Check that the candidate blocks can accommodate all pending leads.
///
/// Undersized blocks fail fast before any aggregate arithmetic. On success
/// the usable blocks come back in their original order for the packer.
pub fn validate(
    blocks: &[CalendarBlock],
    pending_count: usize,
    cfg: &RunConfig,
) -> Result<Vec<CalendarBlock>, CapacityError> {
    let meeting_length = cfg.meeting_length_minutes;

    let (usable, undersized): (Vec<CalendarBlock>, Vec<CalendarBlock>) = blocks
        .iter()
        .cloned()
        .partition(|block| block.fits(meeting_length));

    if !undersized.is_empty() {
        for block in &undersized {
            warn!(
                "Block '{}' ({} - {}) is only {} minutes, below the {}-minute meeting length",
                block.summary,
                block.start_time,
                block.end_time,
                block.duration_minutes(),
                meeting_length
            );
        }
        return Err(CapacityError::InsufficientBlockDuration {
            blocks: undersized,
            meeting_length_minutes: meeting_length,
        });
    }

    let total_minutes: i64 = usable.iter().map(|b| b.duration_minutes()).sum();

    // Real-valued requirement; leads_per_block sharing means a fraction of
    // a slot can be enough.
    let required_minutes =
        pending_count as f64 * meeting_length as f64 / f64::from(cfg.leads_per_block);

    debug!(
        "Capacity check: {} pending leads, {} usable blocks, {} minutes available, {} required",
        pending_count,
        usable.len(),
        total_minutes,
        required_minutes
    );

    if (total_minutes as f64) < required_minutes {
        return Err(CapacityError::InsufficientTotalCapacity {
            required_minutes,
            available_minutes: total_minutes,
        });
    }

    info!(
        "Capacity check passed: {} block(s) with {} minutes cover {} pending lead(s)",
        usable.len(),
        total_minutes,
        pending_count
    );

    Ok(usable)
}
