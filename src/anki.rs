//! Learning metrics from an exported Anki statistics page (German locale).

use crate::cluster::LearningFeatures;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use thiserror::Error;

static TOTAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Insgesamt:\s*(\d[\d \u{a0}.,]*?)\s*Wiederholungen")
        .expect("valid total pattern")
});
static DAYS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Lerntage:\s*(\d[\d \u{a0}.,]*?)\s*von\s*(\d(?:[\d \u{a0}.,]*\d)?)")
        .expect("valid study days pattern")
});
static AVG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Durchschnitt:\s*(\d[\d \u{a0}.,]*?)\s*Wiederholungen/Tag")
        .expect("valid average pattern")
});
static PCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+,\d+)\s*%").expect("valid percentage pattern"));

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("could not read the PDF: {0}")]
    Pdf(String),
    #[error("could not find 'Insgesamt: ... Wiederholungen' in the statistics")]
    MissingTotal,
    #[error("could not find any percentage values (recall rate) in the statistics")]
    MissingAccuracy,
    #[error("unreadable number '{0}'")]
    Number(String),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AnkiMetrics {
    pub total_reviews: u64,
    pub days_active: u64,
    pub days_total: u64,
    pub learning_days_ratio: f64,
    pub reviews_per_learning_day: f64,
    pub daily_reviews: f64,
    pub accuracy: f64,
}

impl AnkiMetrics {
    pub fn features(&self) -> LearningFeatures {
        LearningFeatures {
            learning_days_ratio: self.learning_days_ratio,
            reviews_per_learning_day: self.reviews_per_learning_day,
            daily_reviews: self.daily_reviews,
            accuracy: self.accuracy,
        }
    }
}

/// Keeps digits only, so both `1.234` and `1 234` read as 1234.
fn to_int(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn to_float(raw: &str) -> Result<f64, ExtractError> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    let normalized = if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else {
        compact
    };
    normalized
        .parse()
        .map_err(|_| ExtractError::Number(raw.trim().to_string()))
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

pub fn extract_metrics_from_pdf(bytes: &[u8]) -> Result<AnkiMetrics, ExtractError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::Pdf(format!("{:?}", e)))?;
    extract_metrics(&text)
}

pub fn extract_metrics(text: &str) -> Result<AnkiMetrics, ExtractError> {
    let total_reviews = TOTAL_RE
        .captures_iter(text)
        .map(|c| to_int(&c[1]))
        .max()
        .ok_or(ExtractError::MissingTotal)?;

    let (days_active, days_total) = extract_days(text, total_reviews)?;

    let values = PCT_RE
        .captures_iter(text)
        .map(|c| to_float(&c[1]))
        .collect::<Result<Vec<f64>, _>>()?;
    if values.is_empty() {
        return Err(ExtractError::MissingAccuracy);
    }
    let plausible = values
        .iter()
        .copied()
        .filter(|v| (50.0..=100.0).contains(v))
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
    let accuracy_pct = match plausible {
        Some(v) => v,
        None => {
            log::warn!("No recall rate between 50% and 100%, using the largest percentage");
            values.iter().copied().fold(f64::MIN, f64::max)
        }
    };

    let reviews = total_reviews as f64;
    Ok(AnkiMetrics {
        total_reviews,
        days_active,
        days_total,
        learning_days_ratio: ratio(days_active as f64, days_total as f64),
        reviews_per_learning_day: ratio(reviews, days_active as f64),
        daily_reviews: ratio(reviews, days_total as f64),
        accuracy: accuracy_pct / 100.0,
    })
}

fn extract_days(text: &str, total_reviews: u64) -> Result<(u64, u64), ExtractError> {
    if let Some(c) = DAYS_RE.captures(text) {
        return Ok((to_int(&c[1]), to_int(&c[2])));
    }

    // Only an average is printed: estimate the period from it
    if let Some(c) = AVG_RE.captures(text) {
        let avg = to_float(&c[1])?;
        let days = if avg > 0.0 {
            (total_reviews as f64 / avg).round() as u64
        } else {
            1
        };
        log::warn!("No 'Lerntage' line, estimated {} study days from the daily average", days);
        return Ok((days, days));
    }

    log::warn!("No study-day information found, assuming a single day");
    Ok((1, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{assign_cluster, ClusterKey};

    const FULL: &str = "Statistik\n\
        Heute\n\
        Insgesamt: 120 Wiederholungen\n\
        Lerntage: 10 von 100\n\
        Insgesamt: 1.234 Wiederholungen\n\
        Erinnerungsquote: 87,5 %\n\
        Junge Karten 12,3 % Reife Karten 91,2 %\n";

    #[test]
    fn test_extract_full() {
        let m = extract_metrics(FULL).unwrap();
        assert_eq!(m.total_reviews, 1234);
        assert_eq!(m.days_active, 10);
        assert_eq!(m.days_total, 100);
        assert!((m.learning_days_ratio - 0.1).abs() < 1e-9);
        assert!((m.reviews_per_learning_day - 123.4).abs() < 1e-9);
        assert!((m.daily_reviews - 12.34).abs() < 1e-9);
        assert!((m.accuracy - 0.912).abs() < 1e-9);
        assert_eq!(assign_cluster(&m.features()), ClusterKey::Marathoner);
    }

    #[test]
    fn test_days_with_space_separator() {
        let text = "Insgesamt: 5 000 Wiederholungen\nLerntage: 500 von 1 200\n90,0 %";
        let m = extract_metrics(text).unwrap();
        assert_eq!(m.days_active, 500);
        assert_eq!(m.days_total, 1200);
        assert!((m.learning_days_ratio - 500.0 / 1200.0).abs() < 1e-9);
        assert_eq!(assign_cluster(&m.features()), ClusterKey::Planner);
    }

    #[test]
    fn test_extract_average_fallback() {
        let text = "Insgesamt: 2 000 Wiederholungen\n\
                    Durchschnitt: 40,0 Wiederholungen/Tag\n\
                    Richtig: 88,0 %";
        let m = extract_metrics(text).unwrap();
        assert_eq!(m.total_reviews, 2000);
        assert_eq!(m.days_total, 50);
        assert_eq!(m.days_active, 50);
        assert_eq!(m.learning_days_ratio, 1.0);
        assert_eq!(m.daily_reviews, 40.0);
        assert_eq!(assign_cluster(&m.features()), ClusterKey::Sprinter);
    }

    #[test]
    fn test_extract_minimal_fallback() {
        let m = extract_metrics("Insgesamt: 30 Wiederholungen 70,0 %").unwrap();
        assert_eq!((m.days_active, m.days_total), (1, 1));
        assert_eq!(m.daily_reviews, 30.0);
        assert!((m.accuracy - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_without_plausible_values() {
        let m = extract_metrics("Insgesamt: 30 Wiederholungen 12,5 % 33,3 %").unwrap();
        assert!((m.accuracy - 0.333).abs() < 1e-9);
    }

    #[test]
    fn test_missing_total() {
        let err = extract_metrics("Lerntage: 3 von 4\n90,0 %").unwrap_err();
        assert!(matches!(err, ExtractError::MissingTotal));
    }

    #[test]
    fn test_missing_percentages() {
        let err = extract_metrics("Insgesamt: 30 Wiederholungen").unwrap_err();
        assert!(matches!(err, ExtractError::MissingAccuracy));
        assert!(err.to_string().contains("percentage"));
    }

    #[test]
    fn test_zero_days_do_not_divide() {
        let m = extract_metrics("Insgesamt: 30 Wiederholungen\nLerntage: 0 von 0\n80,0 %").unwrap();
        assert_eq!(m.learning_days_ratio, 0.0);
        assert_eq!(m.reviews_per_learning_day, 0.0);
        assert_eq!(m.daily_reviews, 0.0);
    }

    #[test]
    fn test_invalid_pdf() {
        let err = extract_metrics_from_pdf(b"not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn test_to_float() {
        assert_eq!(to_float("4,5").unwrap(), 4.5);
        assert_eq!(to_float("1.234,5").unwrap(), 1234.5);
        assert_eq!(to_float("12").unwrap(), 12.0);
        assert!(to_float(",").is_err());
    }
}
