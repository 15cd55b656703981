use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_TOTAL_MINUTES: u32 = 15;
pub const MAX_TOTAL_MINUTES: u32 = 480;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Work,
    Break,
}

impl BlockKind {
    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Work => "Work",
            BlockKind::Break => "Break",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScheduleBlock {
    pub kind: BlockKind,
    pub duration_seconds: u32,
    pub sequence_index: usize,
}

/// Ordered result of one plan generation. Immutable once built.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub blocks: Vec<ScheduleBlock>,
    pub requested_total_seconds: u32,
    pub actual_total_seconds: u32,
    pub next_session_delay_hours: f64,
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub block_count: u32,
}

impl SessionPlan {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Seconds scheduled before the block at `index`.
    pub fn seconds_before(&self, index: usize) -> u32 {
        self.blocks
            .iter()
            .take(index)
            .map(|b| b.duration_seconds)
            .sum()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];
}

#[derive(Error, Debug, PartialEq)]
pub enum InputError {
    #[error("total duration must be between 15 and 480 minutes, got {0}")]
    Duration(u32),
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}

/// Validated inputs for the plan builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanInputs {
    pub total_duration_minutes: u32,
    pub time_of_day: TimeOfDay,
    pub concentration: f64,
    pub days_since_last_session: u32,
    pub previous_session_rating: f64,
}

impl PlanInputs {
    pub fn new(
        total_duration_minutes: u32,
        time_of_day: TimeOfDay,
        concentration: f64,
        days_since_last_session: u32,
        previous_session_rating: f64,
    ) -> Result<Self, InputError> {
        if !(MIN_TOTAL_MINUTES..=MAX_TOTAL_MINUTES).contains(&total_duration_minutes) {
            return Err(InputError::Duration(total_duration_minutes));
        }
        check_scale("concentration", concentration)?;
        check_scale("previous session rating", previous_session_rating)?;

        Ok(Self {
            total_duration_minutes,
            time_of_day,
            concentration,
            days_since_last_session,
            previous_session_rating,
        })
    }
}

fn check_scale(field: &'static str, value: f64) -> Result<(), InputError> {
    // NaN fails the contains check as well
    if (1.0..=10.0).contains(&value) {
        Ok(())
    } else {
        Err(InputError::OutOfRange {
            field,
            min: 1.0,
            max: 10.0,
            value,
        })
    }
}
