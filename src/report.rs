use crate::anki::AnkiMetrics;
use crate::cluster::ClusterKey;
use crate::journal::Journal;
use crate::models::SessionPlan;
use crate::stats::calculate_plan_stats;
use crate::utils::format_duration;
use std::fmt::Write;

pub fn render_plan(plan: &SessionPlan) -> String {
    let stats = calculate_plan_stats(plan);
    let mut out = String::new();

    let _ = writeln!(out, "Study Plan");
    let _ = writeln!(out, "==========");
    let _ = writeln!(
        out,
        "Work blocks:       {} x {} min",
        plan.block_count, plan.work_minutes
    );
    let _ = writeln!(out, "Break length:      {} min", plan.break_minutes);
    let _ = writeln!(
        out,
        "Requested:         {}",
        format_duration(plan.requested_total_seconds as i64)
    );
    let _ = writeln!(
        out,
        "Planned:           {} ({} work, {} break)",
        format_duration(plan.actual_total_seconds as i64),
        format_duration(stats.work_seconds as i64),
        format_duration(stats.break_seconds as i64)
    );
    let _ = writeln!(
        out,
        "Next session in:   {:.1} h",
        plan.next_session_delay_hours
    );

    let _ = writeln!(out, "\nSchedule");
    let _ = writeln!(out, "--------");
    let mut offset = 0;
    for block in &plan.blocks {
        let _ = writeln!(
            out,
            "  {:>2}. {:<5}  {:>6}  (starts at +{})",
            block.sequence_index + 1,
            block.kind.label(),
            format_duration(block.duration_seconds as i64),
            format_duration(offset as i64)
        );
        offset += block.duration_seconds;
    }

    out
}

pub fn render_analysis(metrics: &AnkiMetrics, cluster: ClusterKey) -> String {
    let profile = cluster.profile();
    let mut out = String::new();

    let _ = writeln!(out, "Learning Metrics");
    let _ = writeln!(out, "================");
    let _ = writeln!(out, "Total reviews:            {}", metrics.total_reviews);
    let _ = writeln!(
        out,
        "Study days:               {} of {}",
        metrics.days_active, metrics.days_total
    );
    let _ = writeln!(
        out,
        "Study day ratio:          {:.3}",
        metrics.learning_days_ratio
    );
    let _ = writeln!(
        out,
        "Reviews per study day:    {:.1}",
        metrics.reviews_per_learning_day
    );
    let _ = writeln!(out, "Reviews per day:          {:.1}", metrics.daily_reviews);
    let _ = writeln!(
        out,
        "Recall rate:              {:.1} %",
        metrics.accuracy * 100.0
    );

    let _ = writeln!(out, "\nYour learner type: {}", profile.name);
    let _ = writeln!(out, "{}", "-".repeat(19 + profile.name.len()));
    let _ = writeln!(out, "{}", profile.description);
    let _ = writeln!(out, "{}", profile.recommendation);

    out
}

pub fn render_journal(journal: &Journal) -> String {
    let mut out = String::new();
    if journal.entries().is_empty() {
        let _ = writeln!(out, "No sessions logged yet.");
        return out;
    }

    let summary = journal.summary();
    let _ = writeln!(out, "Session Journal ({} entries)", journal.entries().len());
    let _ = writeln!(out, "==========================");
    let _ = writeln!(
        out,
        "  {:<16}  {:<17}  {:<25}  {:>7}  {:>6}  {:>4}  {:>6}",
        "Date", "Strategy", "Subject", "Planned", "Actual", "Base", "Rating"
    );
    for entry in journal.entries() {
        let actual = entry
            .actual_duration_min
            .map(|d| format!("{:.0}m", d))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {:<16}  {:<17}  {:<25}  {:>7}  {:>6}  {:>4}  {:>6}",
            entry.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            entry.learning_strategy.label(),
            entry.subject,
            format!("{}m", entry.planned_duration_min),
            actual,
            entry.baseline_concentration,
            entry.concentration_rating
        );
    }
    let _ = writeln!(out);
    if let Some(avg) = summary.avg_concentration_rating {
        let _ = writeln!(out, "Avg concentration:    {:.1}", avg);
    }
    match summary.avg_actual_duration_min {
        Some(avg) => {
            let _ = writeln!(out, "Avg actual duration:  {:.0} min", avg);
        }
        None => {
            let _ = writeln!(out, "Avg actual duration:  -");
        }
    }
    if let Some(time) = summary.favorite_learning_time {
        let _ = writeln!(out, "Favorite study time:  {}", time.label());
    }

    if !summary.distraction_counts.is_empty() {
        let _ = writeln!(out, "\nMost common distractions");
        let width = summary
            .distraction_counts
            .iter()
            .map(|(_, c)| *c)
            .max()
            .unwrap_or(1);
        for (factor, count) in &summary.distraction_counts {
            let bar = "#".repeat((*count * 20 / width) as usize);
            let _ = writeln!(out, "  {:<22} {:>3} {}", factor, count, bar);
        }
    }

    out
}
