use crate::models::{BlockKind, PlanInputs, ScheduleBlock, SessionPlan};
use crate::predictor::{FeatureVector, Predictor};

pub const WORK_MINUTES_RANGE: (u32, u32) = (15, 45);
pub const BREAK_MINUTES_RANGE: (u32, u32) = (5, 15);

fn clamp_minutes(raw: f64, (min, max): (u32, u32)) -> u32 {
    if raw.is_nan() {
        return min;
    }
    (raw.round().clamp(min as f64, max as f64)) as u32
}

/// Number of work blocks. The trailing break of the last cycle is not needed,
/// so it is credited back before dividing.
pub fn block_count(total_minutes: u32, work_minutes: u32, break_minutes: u32) -> u32 {
    let cycle = work_minutes + break_minutes;
    ((total_minutes + break_minutes) / cycle).max(1)
}

pub fn build_plan<P: Predictor + ?Sized>(inputs: &PlanInputs, predictor: &P) -> SessionPlan {
    let prediction = predictor.predict(&FeatureVector::encode(inputs));

    let work_minutes = clamp_minutes(prediction.work_minutes, WORK_MINUTES_RANGE);
    let break_minutes = clamp_minutes(prediction.break_minutes, BREAK_MINUTES_RANGE);
    let next_session_delay_hours = if prediction.next_session_hours.is_nan() {
        0.0
    } else {
        prediction.next_session_hours.max(0.0)
    };

    let count = block_count(inputs.total_duration_minutes, work_minutes, break_minutes);

    let mut blocks = Vec::with_capacity(count as usize * 2);
    for i in 0..count {
        blocks.push(ScheduleBlock {
            kind: BlockKind::Work,
            duration_seconds: work_minutes * 60,
            sequence_index: blocks.len(),
        });
        if i + 1 < count {
            blocks.push(ScheduleBlock {
                kind: BlockKind::Break,
                duration_seconds: break_minutes * 60,
                sequence_index: blocks.len(),
            });
        }
    }

    let actual_total_seconds = blocks.iter().map(|b| b.duration_seconds).sum();

    log::info!(
        "Built plan: {} x {}m work, {}m break, {}s of {}s requested (raw work {:.1}, break {:.1})",
        count,
        work_minutes,
        break_minutes,
        actual_total_seconds,
        inputs.total_duration_minutes * 60,
        prediction.work_minutes,
        prediction.break_minutes
    );

    SessionPlan {
        blocks,
        requested_total_seconds: inputs.total_duration_minutes * 60,
        actual_total_seconds,
        next_session_delay_hours,
        work_minutes,
        break_minutes,
        block_count: count,
    }
}
