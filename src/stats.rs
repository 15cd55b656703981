use crate::journal::{BestLearningTime, SessionEntry};
use crate::models::{BlockKind, SessionPlan};
use std::collections::BTreeMap;

#[derive(Debug, Default, PartialEq)]
pub struct JournalSummary {
    pub avg_concentration_rating: Option<f64>,
    pub avg_actual_duration_min: Option<f64>,
    pub favorite_learning_time: Option<BestLearningTime>,
    /// Most frequent first, ties alphabetical.
    pub distraction_counts: Vec<(String, u32)>,
}

pub fn calculate_summary(entries: &[SessionEntry]) -> JournalSummary {
    if entries.is_empty() {
        return JournalSummary::default();
    }

    let n = entries.len() as f64;
    let avg_rating = entries
        .iter()
        .map(|e| e.concentration_rating as f64)
        .sum::<f64>()
        / n;

    let durations: Vec<f64> = entries.iter().filter_map(|e| e.actual_duration_min).collect();
    let avg_duration = if durations.is_empty() {
        None
    } else {
        Some(durations.iter().sum::<f64>() / durations.len() as f64)
    };

    // Ties go to the earliest time of day
    let mut favorite: Option<(BestLearningTime, usize)> = None;
    for time in BestLearningTime::ALL {
        let count = entries.iter().filter(|e| e.best_learning_time == time).count();
        if count > 0 && favorite.map_or(true, |(_, best)| count > best) {
            favorite = Some((time, count));
        }
    }

    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for factor in entries.iter().flat_map(|e| e.distraction_factors.iter()) {
        *counts.entry(factor.as_str()).or_default() += 1;
    }
    let mut distraction_counts: Vec<(String, u32)> = counts
        .into_iter()
        .map(|(f, c)| (f.to_string(), c))
        .collect();
    // stable sort keeps the alphabetical order of the map for ties
    distraction_counts.sort_by(|a, b| b.1.cmp(&a.1));

    JournalSummary {
        avg_concentration_rating: Some(avg_rating),
        avg_actual_duration_min: avg_duration,
        favorite_learning_time: favorite.map(|(t, _)| t),
        distraction_counts,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PlanStats {
    pub work_blocks: u32,
    pub break_blocks: u32,
    pub work_seconds: u32,
    pub break_seconds: u32,
    /// actual minus requested, may be negative
    pub deviation_seconds: i64,
}

pub fn calculate_plan_stats(plan: &SessionPlan) -> PlanStats {
    let mut stats = PlanStats::default();
    for block in &plan.blocks {
        match block.kind {
            BlockKind::Work => {
                stats.work_blocks += 1;
                stats.work_seconds += block.duration_seconds;
            }
            BlockKind::Break => {
                stats.break_blocks += 1;
                stats.break_seconds += block.duration_seconds;
            }
        }
    }
    stats.deviation_seconds =
        plan.actual_total_seconds as i64 - plan.requested_total_seconds as i64;
    stats
}
