use crate::stats::{calculate_summary, JournalSummary};
use crate::utils::csv_escape;
use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningStrategy {
    Pomodoro,
    DeepWorkSprints,
    Interleaving,
    FeynmanMethod,
    SpacedRepetition,
}

impl LearningStrategy {
    pub const ALL: [LearningStrategy; 5] = [
        LearningStrategy::Pomodoro,
        LearningStrategy::DeepWorkSprints,
        LearningStrategy::Interleaving,
        LearningStrategy::FeynmanMethod,
        LearningStrategy::SpacedRepetition,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LearningStrategy::Pomodoro => "Pomodoro",
            LearningStrategy::DeepWorkSprints => "Deep-Work sprints",
            LearningStrategy::Interleaving => "Interleaving",
            LearningStrategy::FeynmanMethod => "Feynman method",
            LearningStrategy::SpacedRepetition => "Spaced repetition",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BestLearningTime {
    EarlyMorning,
    LateMorning,
    Afternoon,
    Evening,
    LateEvening,
}

impl BestLearningTime {
    pub const ALL: [BestLearningTime; 5] = [
        BestLearningTime::EarlyMorning,
        BestLearningTime::LateMorning,
        BestLearningTime::Afternoon,
        BestLearningTime::Evening,
        BestLearningTime::LateEvening,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BestLearningTime::EarlyMorning => "Early morning",
            BestLearningTime::LateMorning => "Late morning",
            BestLearningTime::Afternoon => "Afternoon",
            BestLearningTime::Evening => "Evening",
            BestLearningTime::LateEvening => "Late evening",
        }
    }
}

pub const SUBJECTS: [&str; 4] = [
    "Business Administration 1",
    "Microeconomics",
    "Mathematics 1",
    "Private Law",
];

pub const DISTRACTION_FACTORS: [&str; 6] = [
    "Session too long",
    "Started too late",
    "Too few breaks",
    "Notifications/phone",
    "Ambient noise",
    "No answer",
];

pub const NO_ANSWER: &str = "No answer";

#[derive(Error, Debug, PartialEq)]
pub enum JournalError {
    #[error("save a session configuration first")]
    NotConfigured,
    #[error("a session is already running")]
    AlreadyActive,
    #[error("no session is running")]
    NotActive,
    #[error("end a session before giving feedback")]
    NoEndedSession,
    #[error("planned duration must be between 15 and 480 minutes, got {0}")]
    PlannedDuration(u32),
    #[error("{0} must be between 1 and 10")]
    Rating(&'static str),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionConfiguration {
    pub learning_strategy: LearningStrategy,
    pub subject: String,
    pub planned_duration_min: u32,
    pub baseline_concentration: u8,
    pub configured_at: DateTime<Local>,
}

impl SessionConfiguration {
    pub fn new(
        learning_strategy: LearningStrategy,
        subject: impl Into<String>,
        planned_duration_min: u32,
        baseline_concentration: u8,
        configured_at: DateTime<Local>,
    ) -> Result<Self, JournalError> {
        if !(15..=480).contains(&planned_duration_min) {
            return Err(JournalError::PlannedDuration(planned_duration_min));
        }
        if !(1..=10).contains(&baseline_concentration) {
            return Err(JournalError::Rating("baseline concentration"));
        }
        Ok(Self {
            learning_strategy,
            subject: subject.into(),
            planned_duration_min,
            baseline_concentration,
            configured_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub concentration_rating: u8,
    pub best_learning_time: BestLearningTime,
    pub distraction_factors: Vec<String>,
    pub notes: String,
}

impl Feedback {
    pub fn new(
        concentration_rating: u8,
        best_learning_time: BestLearningTime,
        distraction_factors: Vec<String>,
        notes: impl Into<String>,
    ) -> Result<Self, JournalError> {
        if !(1..=10).contains(&concentration_rating) {
            return Err(JournalError::Rating("concentration rating"));
        }
        let distraction_factors = if distraction_factors.is_empty() {
            vec![NO_ANSWER.to_string()]
        } else {
            distraction_factors
        };
        Ok(Self {
            concentration_rating,
            best_learning_time,
            distraction_factors,
            notes: notes.into(),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionEntry {
    pub timestamp: DateTime<Local>,
    pub learning_strategy: LearningStrategy,
    pub subject: String,
    pub planned_duration_min: u32,
    pub actual_duration_min: Option<f64>,
    pub baseline_concentration: u8,
    pub concentration_rating: u8,
    pub best_learning_time: BestLearningTime,
    pub distraction_factors: Vec<String>,
    pub notes: String,
}

/// In-memory log of study sessions and their feedback.
#[derive(Debug, Default)]
pub struct Journal {
    configuration: Option<SessionConfiguration>,
    active: bool,
    session_start: Option<DateTime<Local>>,
    session_duration: Option<Duration>,
    entries: Vec<SessionEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configuration(&self) -> Option<&SessionConfiguration> {
        self.configuration.as_ref()
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    /// Duration of the last ended session still waiting for feedback.
    pub fn pending_duration(&self) -> Option<Duration> {
        self.session_duration
    }

    pub fn configure(&mut self, configuration: SessionConfiguration) {
        log::info!(
            "Session configured: {} / {} ({} min)",
            configuration.learning_strategy.label(),
            configuration.subject,
            configuration.planned_duration_min
        );
        self.configuration = Some(configuration);
    }

    pub fn start(&mut self, now: DateTime<Local>) -> Result<(), JournalError> {
        if self.configuration.is_none() {
            return Err(JournalError::NotConfigured);
        }
        if self.active {
            return Err(JournalError::AlreadyActive);
        }
        self.active = true;
        self.session_start = Some(now);
        self.session_duration = None;
        Ok(())
    }

    pub fn stop(&mut self, now: DateTime<Local>) -> Result<Duration, JournalError> {
        if !self.active {
            return Err(JournalError::NotActive);
        }
        self.active = false;
        let duration = self
            .session_start
            .map(|start| (now - start).max(Duration::zero()))
            .unwrap_or_else(Duration::zero);
        self.session_duration = Some(duration);
        Ok(duration)
    }

    pub fn elapsed(&self, now: DateTime<Local>) -> Option<Duration> {
        match (self.active, self.session_start) {
            (true, Some(start)) => Some(now - start),
            _ => None,
        }
    }

    pub fn record_feedback(
        &mut self,
        feedback: Feedback,
        now: DateTime<Local>,
    ) -> Result<&SessionEntry, JournalError> {
        let duration = self.session_duration.ok_or(JournalError::NoEndedSession)?;
        let Some(configuration) = self.configuration.as_ref() else {
            self.session_duration = None;
            self.active = false;
            return Err(JournalError::NotConfigured);
        };

        self.entries.push(SessionEntry {
            timestamp: now,
            learning_strategy: configuration.learning_strategy,
            subject: configuration.subject.clone(),
            planned_duration_min: configuration.planned_duration_min,
            actual_duration_min: Some(duration.num_milliseconds() as f64 / 60_000.0),
            baseline_concentration: configuration.baseline_concentration,
            concentration_rating: feedback.concentration_rating,
            best_learning_time: feedback.best_learning_time,
            distraction_factors: feedback.distraction_factors,
            notes: feedback.notes,
        });
        // Another session has to run before the next feedback
        self.session_duration = None;
        self.active = false;

        let entry = &self.entries[self.entries.len() - 1];
        log::info!("Feedback recorded, {} entries", self.entries.len());
        Ok(entry)
    }

    pub fn summary(&self) -> JournalSummary {
        calculate_summary(&self.entries)
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::from(
            "timestamp,learning_strategy,subject,planned_duration_min,actual_duration_min,\
             baseline_concentration,concentration_rating,best_learning_time,distraction_factors,notes\n",
        );
        for e in &self.entries {
            let row = [
                e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                e.learning_strategy.label().to_string(),
                e.subject.clone(),
                e.planned_duration_min.to_string(),
                e.actual_duration_min
                    .map(|d| format!("{:.2}", d))
                    .unwrap_or_default(),
                e.baseline_concentration.to_string(),
                e.concentration_rating.to_string(),
                e.best_learning_time.label().to_string(),
                e.distraction_factors.join(", "),
                e.notes.clone(),
            ];
            let row: Vec<String> = row.iter().map(|f| csv_escape(f)).collect();
            csv.push_str(&row.join(","));
            csv.push('\n');
        }
        csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 6, 14, 0, 0).unwrap()
    }

    fn config() -> SessionConfiguration {
        SessionConfiguration::new(LearningStrategy::Pomodoro, "Microeconomics", 90, 7, t0())
            .unwrap()
    }

    fn run_session(
        journal: &mut Journal,
        start: DateTime<Local>,
        minutes: i64,
        rating: u8,
        time: BestLearningTime,
        factors: &[&str],
    ) {
        journal.start(start).unwrap();
        journal.stop(start + Duration::minutes(minutes)).unwrap();
        let feedback = Feedback::new(
            rating,
            time,
            factors.iter().map(|f| f.to_string()).collect(),
            "",
        )
        .unwrap();
        journal
            .record_feedback(feedback, start + Duration::minutes(minutes + 1))
            .unwrap();
    }

    #[test]
    fn test_start_requires_configuration() {
        let mut journal = Journal::new();
        assert_eq!(journal.start(t0()), Err(JournalError::NotConfigured));
        journal.configure(config());
        assert!(journal.start(t0()).is_ok());
        assert_eq!(journal.start(t0()), Err(JournalError::AlreadyActive));
    }

    #[test]
    fn test_stop_measures_duration() {
        let mut journal = Journal::new();
        journal.configure(config());
        assert_eq!(journal.stop(t0()), Err(JournalError::NotActive));
        journal.start(t0()).unwrap();
        assert_eq!(
            journal.elapsed(t0() + Duration::seconds(75)),
            Some(Duration::seconds(75))
        );
        let d = journal.stop(t0() + Duration::minutes(50)).unwrap();
        assert_eq!(d, Duration::minutes(50));
        assert_eq!(journal.pending_duration(), Some(Duration::minutes(50)));
        assert_eq!(journal.elapsed(t0() + Duration::minutes(60)), None);
    }

    #[test]
    fn test_feedback_requires_ended_session() {
        let mut journal = Journal::new();
        journal.configure(config());
        let feedback = Feedback::new(8, BestLearningTime::Evening, vec![], "").unwrap();
        assert_eq!(
            journal.record_feedback(feedback.clone(), t0()).unwrap_err(),
            JournalError::NoEndedSession
        );

        journal.start(t0()).unwrap();
        journal.stop(t0() + Duration::minutes(45)).unwrap();
        let entry = journal.record_feedback(feedback.clone(), t0()).unwrap();
        assert_eq!(entry.actual_duration_min, Some(45.0));
        assert_eq!(entry.distraction_factors, vec![NO_ANSWER.to_string()]);
        assert_eq!(entry.subject, "Microeconomics");

        // Feedback can only be given once per session
        assert_eq!(
            journal.record_feedback(feedback, t0()).unwrap_err(),
            JournalError::NoEndedSession
        );
        assert_eq!(journal.entries().len(), 1);
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            SessionConfiguration::new(LearningStrategy::Interleaving, "x", 10, 5, t0()),
            Err(JournalError::PlannedDuration(10))
        );
        assert!(
            SessionConfiguration::new(LearningStrategy::Interleaving, "x", 60, 0, t0()).is_err()
        );
        assert!(Feedback::new(11, BestLearningTime::Afternoon, vec![], "").is_err());
    }

    #[test]
    fn test_summary() {
        let mut journal = Journal::new();
        assert_eq!(journal.summary(), JournalSummary::default());

        journal.configure(config());
        run_session(
            &mut journal,
            t0(),
            30,
            6,
            BestLearningTime::Evening,
            &["Too few breaks", "Ambient noise"],
        );
        run_session(
            &mut journal,
            t0() + Duration::hours(2),
            60,
            8,
            BestLearningTime::Afternoon,
            &["Ambient noise"],
        );
        run_session(
            &mut journal,
            t0() + Duration::hours(4),
            45,
            10,
            BestLearningTime::Evening,
            &[],
        );

        let summary = journal.summary();
        assert_eq!(summary.avg_concentration_rating, Some(8.0));
        assert_eq!(summary.avg_actual_duration_min, Some(45.0));
        assert_eq!(summary.favorite_learning_time, Some(BestLearningTime::Evening));
        assert_eq!(
            summary.distraction_counts,
            vec![
                ("Ambient noise".to_string(), 2),
                ("No answer".to_string(), 1),
                ("Too few breaks".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_to_csv() {
        let mut journal = Journal::new();
        journal.configure(config());
        journal.start(t0()).unwrap();
        journal.stop(t0() + Duration::seconds(90)).unwrap();
        let feedback = Feedback::new(
            7,
            BestLearningTime::LateMorning,
            vec!["Session too long".into(), "Notifications/phone".into()],
            "said \"hi\"",
        )
        .unwrap();
        journal.record_feedback(feedback, t0()).unwrap();

        let csv = journal.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("timestamp,learning_strategy,subject,"));
        assert_eq!(
            lines[1],
            "2024-05-06 14:00:00,Pomodoro,Microeconomics,90,1.50,7,7,Late morning,\
             \"Session too long, Notifications/phone\",\"said \"\"hi\"\"\""
        );
    }
}
