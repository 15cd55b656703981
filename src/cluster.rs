use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClusterKey {
    Sprinter,
    Marathoner,
    Planner,
}

pub struct ClusterProfile {
    pub key: ClusterKey,
    pub name: &'static str,
    pub description: &'static str,
    pub recommendation: &'static str,
}

const SPRINTER: ClusterProfile = ClusterProfile {
    key: ClusterKey::Sprinter,
    name: "Sprinter",
    description: "Studies often in rather short units. Many reviews, short intervals \
                  and a high study frequency.",
    recommendation: "Recommended block length: 20-30 minutes of focus, 5 minutes of break.",
};

const MARATHONER: ClusterProfile = ClusterProfile {
    key: ClusterKey::Marathoner,
    name: "Marathoner",
    description: "Studies rarely but very intensely. Many reviews per study day, long \
                  intervals and a high recall rate.",
    recommendation: "Recommended block length: 60-75 minutes of focus, 10-15 minutes of break.",
};

const PLANNER: ClusterProfile = ClusterProfile {
    key: ClusterKey::Planner,
    name: "Structured planner",
    description: "Studies regularly in medium-sized blocks with solid consistency. \
                  Neither extreme peaks nor long gaps.",
    recommendation: "Recommended block length: 35-50 minutes of focus, 5-10 minutes of break.",
};

impl ClusterKey {
    pub fn profile(self) -> &'static ClusterProfile {
        match self {
            ClusterKey::Sprinter => &SPRINTER,
            ClusterKey::Marathoner => &MARATHONER,
            ClusterKey::Planner => &PLANNER,
        }
    }
}

/// Ratios the classifier looks at. Unset fields count as 0.0 via `Default`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LearningFeatures {
    pub learning_days_ratio: f64,
    pub reviews_per_learning_day: f64,
    pub daily_reviews: f64,
    pub accuracy: f64,
}

pub fn assign_cluster(features: &LearningFeatures) -> ClusterKey {
    let ldr = features.learning_days_ratio;

    // Few study days, but a lot of output with a good recall rate
    if ldr < 0.2 && features.reviews_per_learning_day > 80.0 && features.accuracy >= 0.8 {
        return ClusterKey::Marathoner;
    }

    if ldr >= 0.3 && (20.0..=80.0).contains(&features.daily_reviews) {
        return ClusterKey::Sprinter;
    }

    ClusterKey::Planner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marathoner() {
        let f = LearningFeatures {
            learning_days_ratio: 0.1,
            reviews_per_learning_day: 120.0,
            accuracy: 0.85,
            ..Default::default()
        };
        assert_eq!(assign_cluster(&f), ClusterKey::Marathoner);
    }

    #[test]
    fn test_sprinter() {
        let f = LearningFeatures {
            learning_days_ratio: 0.5,
            daily_reviews: 40.0,
            ..Default::default()
        };
        assert_eq!(assign_cluster(&f), ClusterKey::Sprinter);
    }

    #[test]
    fn test_planner_default() {
        assert_eq!(
            assign_cluster(&LearningFeatures::default()),
            ClusterKey::Planner
        );
        // Marathoner except for accuracy
        let f = LearningFeatures {
            learning_days_ratio: 0.1,
            reviews_per_learning_day: 120.0,
            accuracy: 0.79,
            ..Default::default()
        };
        assert_eq!(assign_cluster(&f), ClusterKey::Planner);
        // Gap between the two ratio thresholds
        let f = LearningFeatures {
            learning_days_ratio: 0.25,
            daily_reviews: 40.0,
            ..Default::default()
        };
        assert_eq!(assign_cluster(&f), ClusterKey::Planner);
    }

    #[test]
    fn test_sprinter_bounds_inclusive() {
        for dr in [20.0, 80.0] {
            let f = LearningFeatures {
                learning_days_ratio: 0.3,
                daily_reviews: dr,
                ..Default::default()
            };
            assert_eq!(assign_cluster(&f), ClusterKey::Sprinter);
        }
        let f = LearningFeatures {
            learning_days_ratio: 0.3,
            daily_reviews: 80.5,
            ..Default::default()
        };
        assert_eq!(assign_cluster(&f), ClusterKey::Planner);
    }

    #[test]
    fn test_missing_features_default_to_zero() {
        let f = LearningFeatures {
            learning_days_ratio: 0.6,
            daily_reviews: 25.0,
            ..Default::default()
        };
        assert_eq!(f.accuracy, 0.0);
        assert_eq!(f.reviews_per_learning_day, 0.0);
        assert_eq!(assign_cluster(&f), ClusterKey::Sprinter);
    }

    #[test]
    fn test_profiles_match_keys() {
        for key in [ClusterKey::Sprinter, ClusterKey::Marathoner, ClusterKey::Planner] {
            assert_eq!(key.profile().key, key);
        }
        assert_eq!(ClusterKey::Planner.profile().name, "Structured planner");
    }
}
