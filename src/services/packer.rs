use chrono::Duration;
use tracing::{debug, warn};

use crate::models::calendar::{Assignment, CalendarBlock, MeetingSlot};
use crate::models::run::RunConfig;
use crate::models::task::LeadTask;

/// Pack pending leads into consecutive meeting slots across the blocks.
///
/// Walks blocks in input order, carving each into
/// floor(duration / meeting_length) sequential slots and assigning up to
/// leads_per_block leads per slot, in strict lead input order. Leftover
/// slot capacity stays unused; leftover leads beyond block capacity stay
/// unassigned. Deterministic: identical inputs yield identical output.
pub fn pack(blocks: &[CalendarBlock], tasks: &[LeadTask], cfg: &RunConfig) -> Vec<Assignment> {
    let meeting_length = Duration::minutes(cfg.meeting_length_minutes);
    let mut assignments = Vec::new();
    let mut cursor = 0usize;

    'blocks: for block in blocks {
        let slots_in_block = block.duration_minutes() / cfg.meeting_length_minutes;
        let mut slot_start = block.start_time;

        debug!(
            "Packing block '{}' ({} minutes, {} slot(s))",
            block.summary,
            block.duration_minutes(),
            slots_in_block
        );

        for _ in 0..slots_in_block {
            if cursor >= tasks.len() {
                break 'blocks;
            }

            let slot_end = slot_start + meeting_length;

            for _ in 0..cfg.leads_per_block {
                if cursor >= tasks.len() {
                    break 'blocks;
                }

                assignments.push(Assignment {
                    task: tasks[cursor].clone(),
                    slot: MeetingSlot {
                        start_time: slot_start,
                        end_time: slot_end,
                    },
                    block_label: block.summary.clone(),
                });
                cursor += 1;
            }

            slot_start = slot_end;
        }
    }

    if cursor < tasks.len() {
        // Should not happen after a passing capacity check; stop cleanly
        // rather than over-pack.
        warn!(
            "{} lead(s) left unassigned after filling all blocks",
            tasks.len() - cursor
        );
    }

    debug!(
        "Packed {} assignment(s) for {} lead(s) across {} block(s)",
        assignments.len(),
        tasks.len(),
        blocks.len()
    );

    assignments
}
