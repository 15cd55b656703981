//! Line-based session companion: configure, time, and review study sessions.

use crate::journal::{
    BestLearningTime, Feedback, Journal, LearningStrategy, SessionConfiguration,
    DISTRACTION_FACTORS, SUBJECTS,
};
use crate::report::render_journal;
use crate::storage::Storage;
use crate::utils::{format_clock, format_duration};
use anyhow::Result;
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};

pub struct Dialogue<'a, R, W, C> {
    input: R,
    output: W,
    journal: &'a mut Journal,
    storage: &'a Storage,
    clock: C,
}

enum Step {
    Continue,
    Quit,
}

impl<'a, R, W, C> Dialogue<'a, R, W, C>
where
    R: BufRead,
    W: Write,
    C: Fn() -> DateTime<Local>,
{
    pub fn new(
        input: R,
        output: W,
        journal: &'a mut Journal,
        storage: &'a Storage,
        clock: C,
    ) -> Self {
        Self {
            input,
            output,
            journal,
            storage,
            clock,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "Study Session Companion")?;
        writeln!(self.output, "Plan your session, track it and give feedback afterwards.")?;
        loop {
            self.print_status()?;
            writeln!(
                self.output,
                "\n[c] configure  [s] start  [e] end  [v] view  [x] export  [q] quit"
            )?;
            let Some(choice) = self.ask("> ")? else {
                return Ok(());
            };
            let step = match choice.as_str() {
                "c" => self.configure()?,
                "s" => self.start()?,
                "e" => self.end()?,
                "v" => {
                    write!(self.output, "\n{}", render_journal(self.journal))?;
                    Step::Continue
                }
                "x" => {
                    self.export()?;
                    Step::Continue
                }
                "q" => Step::Quit,
                "" => Step::Continue,
                other => {
                    writeln!(self.output, "Unknown command '{}'", other)?;
                    Step::Continue
                }
            };
            if let Step::Quit = step {
                return Ok(());
            }
        }
    }

    fn print_status(&mut self) -> Result<()> {
        let now = (self.clock)();
        if let Some(config) = self.journal.configuration() {
            writeln!(
                self.output,
                "\nStrategy: {} | Subject: {} | Planned: {} min",
                config.learning_strategy.label(),
                config.subject,
                config.planned_duration_min
            )?;
        }
        match self.journal.elapsed(now) {
            Some(elapsed) => writeln!(
                self.output,
                "Session running for {}",
                format_clock(elapsed.num_seconds())
            )?,
            None => match self.journal.pending_duration() {
                Some(d) => writeln!(
                    self.output,
                    "Last session lasted {}, waiting for feedback.",
                    format_duration(d.num_seconds())
                )?,
                None => writeln!(self.output, "No session running.")?,
            },
        }
        Ok(())
    }

    fn configure(&mut self) -> Result<Step> {
        let strategies: Vec<&str> = LearningStrategy::ALL.iter().map(|s| s.label()).collect();
        let Some(strategy) = self.choose("Learning strategy", &strategies)? else {
            return Ok(Step::Quit);
        };
        let Some(subject) = self.choose("Subject", &SUBJECTS)? else {
            return Ok(Step::Quit);
        };
        let Some(planned) =
            self.ask_number("Planned total duration in minutes (15-480)", 15, 480)?
        else {
            return Ok(Step::Quit);
        };
        let Some(baseline) =
            self.ask_number("Expected concentration at the start (1-10)", 1, 10)?
        else {
            return Ok(Step::Quit);
        };

        let config = SessionConfiguration::new(
            LearningStrategy::ALL[strategy],
            SUBJECTS[subject],
            planned,
            baseline as u8,
            (self.clock)(),
        )?;
        self.journal.configure(config);
        writeln!(self.output, "Configuration saved. You can start the session now.")?;
        Ok(Step::Continue)
    }

    fn start(&mut self) -> Result<Step> {
        match self.journal.start((self.clock)()) {
            Ok(()) => writeln!(self.output, "Session started.")?,
            Err(e) => writeln!(self.output, "Cannot start: {}", e)?,
        }
        Ok(Step::Continue)
    }

    fn end(&mut self) -> Result<Step> {
        let duration = match self.journal.stop((self.clock)()) {
            Ok(d) => d,
            Err(e) => {
                writeln!(self.output, "Cannot end: {}", e)?;
                return Ok(Step::Continue);
            }
        };
        writeln!(
            self.output,
            "Session ended after {}. Please give your feedback.",
            format_duration(duration.num_seconds())
        )?;
        self.feedback()
    }

    fn feedback(&mut self) -> Result<Step> {
        let Some(rating) = self.ask_number("Concentration rating (1-10)", 1, 10)? else {
            return Ok(Step::Quit);
        };
        let times: Vec<&str> = BestLearningTime::ALL.iter().map(|t| t.label()).collect();
        let Some(time) = self.choose("Best learning time", &times)? else {
            return Ok(Step::Quit);
        };
        let Some(factors) = self.choose_many("Distraction factors", &DISTRACTION_FACTORS)? else {
            return Ok(Step::Quit);
        };
        let Some(notes) = self.ask("Notes (optional): ")? else {
            return Ok(Step::Quit);
        };

        let feedback = Feedback::new(
            rating as u8,
            BestLearningTime::ALL[time],
            factors
                .into_iter()
                .map(|i| DISTRACTION_FACTORS[i].to_string())
                .collect(),
            notes,
        )?;
        match self.journal.record_feedback(feedback, (self.clock)()) {
            Ok(_) => writeln!(self.output, "Feedback saved!")?,
            Err(e) => writeln!(self.output, "Feedback not saved: {}", e)?,
        }
        Ok(Step::Continue)
    }

    fn export(&mut self) -> Result<()> {
        self.storage.export(self.journal)?;
        writeln!(
            self.output,
            "Exported {} sessions to {}",
            self.journal.entries().len(),
            self.storage.path().display()
        )?;
        Ok(())
    }

    /// `None` on end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask_number(&mut self, prompt: &str, min: u32, max: u32) -> Result<Option<u32>> {
        loop {
            let Some(answer) = self.ask(&format!("{}: ", prompt))? else {
                return Ok(None);
            };
            match answer.parse::<u32>() {
                Ok(n) if (min..=max).contains(&n) => return Ok(Some(n)),
                _ => writeln!(self.output, "Please enter a number between {} and {}.", min, max)?,
            }
        }
    }

    fn choose(&mut self, prompt: &str, options: &[&str]) -> Result<Option<usize>> {
        writeln!(self.output, "{}:", prompt)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, option)?;
        }
        let choice = self.ask_number("Choice", 1, options.len() as u32)?;
        Ok(choice.map(|n| n as usize - 1))
    }

    /// Comma separated choices; an empty answer selects nothing.
    fn choose_many(&mut self, prompt: &str, options: &[&str]) -> Result<Option<Vec<usize>>> {
        writeln!(self.output, "{} (comma separated, empty for none):", prompt)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, option)?;
        }
        loop {
            let Some(answer) = self.ask("Choices: ")? else {
                return Ok(None);
            };
            let parsed: Option<Vec<usize>> = answer
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| match s.parse::<usize>() {
                    Ok(n) if (1..=options.len()).contains(&n) => Some(n - 1),
                    _ => None,
                })
                .collect();
            match parsed {
                Some(picks) => {
                    // keep the first mention of each choice
                    let mut seen = BTreeSet::new();
                    let unique = picks.into_iter().filter(|i| seen.insert(*i)).collect();
                    return Ok(Some(unique));
                }
                None => writeln!(
                    self.output,
                    "Please enter numbers between 1 and {}.",
                    options.len()
                )?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::cell::Cell;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_full_session_flow() -> Result<()> {
        let dir = tempdir()?;
        let storage = Storage::from_path(dir.path().join("log.csv"));
        let mut journal = Journal::new();

        let base = Local.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let ticks = Cell::new(0i64);
        // every clock read advances five minutes
        let clock = || {
            let n = ticks.get();
            ticks.set(n + 1);
            base + Duration::minutes(5 * n)
        };

        let script = "c\n2\n3\n90\n7\ns\ne\n8\n4\n2, 5\nfocused\nx\nq\n";
        let mut output = Vec::new();
        Dialogue::new(Cursor::new(script), &mut output, &mut journal, &storage, clock).run()?;

        assert_eq!(journal.entries().len(), 1);
        let entry = &journal.entries()[0];
        assert_eq!(entry.learning_strategy, LearningStrategy::DeepWorkSprints);
        assert_eq!(entry.subject, "Mathematics 1");
        assert_eq!(entry.planned_duration_min, 90);
        assert_eq!(entry.concentration_rating, 8);
        assert_eq!(entry.best_learning_time, BestLearningTime::Evening);
        assert_eq!(
            entry.distraction_factors,
            vec!["Started too late".to_string(), "Ambient noise".to_string()]
        );
        assert_eq!(entry.notes, "focused");
        assert!(entry.actual_duration_min.unwrap() > 0.0);

        let text = String::from_utf8(output)?;
        assert!(text.contains("Configuration saved."));
        assert!(text.contains("Feedback saved!"));
        assert!(storage.path().exists());
        Ok(())
    }

    #[test]
    fn test_repeated_distraction_choice_counts_once() -> Result<()> {
        let dir = tempdir()?;
        let storage = Storage::from_path(dir.path().join("log.csv"));
        let mut journal = Journal::new();
        let mut output = Vec::new();

        let script = "c\n1\n1\n60\n5\ns\ne\n6\n1\n2,5,2\n\nq\n";
        Dialogue::new(
            Cursor::new(script),
            &mut output,
            &mut journal,
            &storage,
            Local::now,
        )
        .run()?;

        assert_eq!(
            journal.entries()[0].distraction_factors,
            vec!["Started too late".to_string(), "Ambient noise".to_string()]
        );
        assert_eq!(
            journal.summary().distraction_counts,
            vec![
                ("Ambient noise".to_string(), 1),
                ("Started too late".to_string(), 1)
            ]
        );
        Ok(())
    }

    #[test]
    fn test_start_without_configuration() -> Result<()> {
        let dir = tempdir()?;
        let storage = Storage::from_path(dir.path().join("log.csv"));
        let mut journal = Journal::new();
        let mut output = Vec::new();

        Dialogue::new(
            Cursor::new("s\ne\nq\n"),
            &mut output,
            &mut journal,
            &storage,
            Local::now,
        )
        .run()?;

        let text = String::from_utf8(output)?;
        assert!(text.contains("Cannot start: save a session configuration first"));
        assert!(text.contains("Cannot end: no session is running"));
        assert!(journal.entries().is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_numbers_reprompt_and_eof_quits() -> Result<()> {
        let dir = tempdir()?;
        let storage = Storage::from_path(dir.path().join("log.csv"));
        let mut journal = Journal::new();
        let mut output = Vec::new();

        Dialogue::new(
            Cursor::new("c\n9\n1\n1\n5\n"),
            &mut output,
            &mut journal,
            &storage,
            Local::now,
        )
        .run()?;

        let text = String::from_utf8(output)?;
        assert!(text.contains("Please enter a number between 1 and 5."));
        assert!(text.contains("Please enter a number between 15 and 480."));
        assert!(journal.configuration().is_none());
        Ok(())
    }
}
