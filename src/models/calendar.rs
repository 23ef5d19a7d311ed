use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::task::LeadTask;

// An operator-created placeholder reservation on the calendar, later carved
// into meeting slots. Instants are UTC and pass through as ISO-8601.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarBlock {
    pub id: String,
    pub summary: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl CalendarBlock {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// A block is usable only if it can hold at least one full meeting.
    pub fn fits(&self, meeting_length_minutes: i64) -> bool {
        self.duration_minutes() >= meeting_length_minutes
    }
}

// A carved sub-interval of a block, sized to exactly one meeting.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MeetingSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

// The binding of one lead task to one meeting slot. The parent block's
// label rides along so failures can name the window they happened in.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Assignment {
    pub task: LeadTask,
    pub slot: MeetingSlot,
    pub block_label: String,
}
