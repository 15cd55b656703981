//! Countdown over the blocks of a [`SessionPlan`].
//!
//! There is no background clock. Every query takes `now` and recomputes the
//! remaining time from stored timestamps, so the caller decides how often the
//! countdown is observed. Expiry is detected lazily by [`BlockTimer::tick`].
//!
//! ```text
//! Idle -start-> Running -pause-> Paused -resume-> Running
//! Running -tick (remaining <= 0)-> Expired -advance-> Idle(next) | Complete
//! Idle | Running | Paused | Expired -skip-> Idle(next) | Complete
//! ```
//!
//! Transitions that do not apply to the current phase are no-ops and return
//! `false`.

use crate::models::{ScheduleBlock, SessionPlan};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Expired,
    Complete,
}

pub struct BlockTimer {
    plan: SessionPlan,
    active_index: usize,
    phase: Phase,
    started_at: Option<DateTime<Utc>>,
    /// Sum of all paused intervals of the current block.
    accumulated_pause: Duration,
    paused_at: Option<DateTime<Utc>>,
    /// Frozen remaining time while paused.
    paused_at_remaining: Option<Duration>,
}

impl BlockTimer {
    pub fn new(plan: SessionPlan) -> Self {
        let phase = if plan.is_empty() {
            Phase::Complete
        } else {
            Phase::Idle
        };
        Self {
            plan,
            active_index: 0,
            phase,
            started_at: None,
            accumulated_pause: Duration::zero(),
            paused_at: None,
            paused_at_remaining: None,
        }
    }

    pub fn plan(&self) -> &SessionPlan {
        &self.plan
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn current_block(&self) -> Option<&ScheduleBlock> {
        self.plan.blocks.get(self.active_index)
    }

    fn block_duration(&self) -> Duration {
        self.current_block()
            .map(|b| Duration::seconds(b.duration_seconds as i64))
            .unwrap_or_else(Duration::zero)
    }

    fn elapsed_running(&self, now: DateTime<Utc>) -> Duration {
        match self.started_at {
            Some(start) => (now - start - self.accumulated_pause).max(Duration::zero()),
            None => Duration::zero(),
        }
    }

    /// Remaining time of the active block. Never mutates.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match self.phase {
            Phase::Idle => self.block_duration(),
            Phase::Running => {
                (self.block_duration() - self.elapsed_running(now)).max(Duration::zero())
            }
            Phase::Paused => self
                .paused_at_remaining
                .unwrap_or_else(|| self.block_duration()),
            Phase::Expired | Phase::Complete => Duration::zero(),
        }
    }

    /// Remaining whole seconds, rounded up so a fresh block shows its full length.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        let ms = self.remaining(now).num_milliseconds();
        (ms + 999) / 1000
    }

    /// 0.0 .. 1.0 progress within the active block.
    pub fn block_progress(&self, now: DateTime<Utc>) -> f64 {
        let total = self.block_duration().num_milliseconds();
        if total == 0 {
            return if self.is_complete() { 1.0 } else { 0.0 };
        }
        1.0 - self.remaining(now).num_milliseconds() as f64 / total as f64
    }

    /// 0.0 .. 1.0 progress across the whole plan.
    pub fn plan_progress(&self, now: DateTime<Utc>) -> f64 {
        let total = self.plan.actual_total_seconds as f64;
        if total == 0.0 {
            return 0.0;
        }
        if self.is_complete() {
            return 1.0;
        }
        let done = self.plan.seconds_before(self.active_index) as f64;
        let current =
            (self.block_duration() - self.remaining(now)).num_milliseconds() as f64 / 1000.0;
        ((done + current) / total).min(1.0)
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != Phase::Idle || self.current_block().is_none() {
            return false;
        }
        self.phase = Phase::Running;
        self.started_at = Some(now);
        self.accumulated_pause = Duration::zero();
        self.paused_at = None;
        self.paused_at_remaining = None;
        log::debug!("Block {} started", self.active_index);
        true
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != Phase::Running || self.tick(now) {
            return false;
        }
        self.paused_at_remaining = Some(self.remaining(now));
        self.paused_at = Some(now);
        self.phase = Phase::Paused;
        log::debug!(
            "Block {} paused with {}s remaining",
            self.active_index,
            self.remaining_seconds(now)
        );
        true
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        if let Some(paused_at) = self.paused_at.take() {
            self.accumulated_pause += (now - paused_at).max(Duration::zero());
        }
        self.paused_at_remaining = None;
        self.phase = Phase::Running;
        log::debug!(
            "Block {} resumed, {}s paused in total",
            self.active_index,
            self.accumulated_pause.num_seconds()
        );
        true
    }

    /// Moves a running block whose countdown reached zero to `Expired`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase == Phase::Running && self.remaining(now) <= Duration::zero() {
            self.phase = Phase::Expired;
            log::debug!("Block {} expired", self.active_index);
            return true;
        }
        false
    }

    pub fn advance(&mut self) -> bool {
        if self.phase != Phase::Expired {
            return false;
        }
        self.next_block();
        true
    }

    pub fn skip(&mut self) -> bool {
        if self.phase == Phase::Complete {
            return false;
        }
        log::debug!("Block {} skipped", self.active_index);
        self.next_block();
        true
    }

    /// Re-arms the active block from its full duration.
    pub fn reset(&mut self) -> bool {
        if self.phase == Phase::Complete {
            return false;
        }
        self.clear_bookkeeping();
        self.phase = Phase::Idle;
        log::debug!("Block {} reset", self.active_index);
        true
    }

    pub fn end_session(&mut self) {
        self.active_index = 0;
        self.clear_bookkeeping();
        self.phase = if self.plan.is_empty() {
            Phase::Complete
        } else {
            Phase::Idle
        };
        log::debug!("Session ended, rewound to first block");
    }

    fn next_block(&mut self) {
        self.active_index = (self.active_index + 1).min(self.plan.len());
        self.clear_bookkeeping();
        if self.active_index == self.plan.len() {
            self.phase = Phase::Complete;
            log::info!("Plan complete");
        } else {
            self.phase = Phase::Idle;
        }
    }

    fn clear_bookkeeping(&mut self) {
        self.started_at = None;
        self.accumulated_pause = Duration::zero();
        self.paused_at = None;
        self.paused_at_remaining = None;
    }
}
