//! Advice shown on the recommendations screen.
//!
//! Items are derived from the session's average rate and quality score,
//! followed by two standing items that always apply.

use crate::pattern::TestPattern;
use crate::quality::TARGET_RATE;
use crate::session::Session;
use serde::{Deserialize, Serialize};

/// Average rate below which the low-rate item is raised.
pub const LOW_RATE_THRESHOLD: u32 = 350;

/// Quality score below which the retest item is raised.
pub const LOW_QUALITY_THRESHOLD: u8 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One recommendation, optionally pointing at the screen that addresses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub action: Option<TestPattern>,
}

/// Recommendations for the current session.
pub fn recommendations(session: &Session) -> Vec<Recommendation> {
    recommendations_for(session.stats().avg_rate(), session.quality_score())
}

/// Recommendations for an average rate and quality score.
pub fn recommendations_for(avg_rate: u32, quality_score: u8) -> Vec<Recommendation> {
    let mut items = Vec::with_capacity(4);

    if avg_rate < LOW_RATE_THRESHOLD {
        items.push(Recommendation {
            title: "Low refresh rate".to_string(),
            description: format!(
                "Average rate is {} Hz. Check the monitor and graphics driver settings to reach the {} Hz target.",
                avg_rate,
                TARGET_RATE
            ),
            priority: Priority::High,
            action: Some(TestPattern::Fps),
        });
    }

    if quality_score < LOW_QUALITY_THRESHOLD {
        items.push(Recommendation {
            title: "Quality below optimal".to_string(),
            description: format!(
                "Current quality score is {}%. Run the full test cycle to improve the result.",
                quality_score
            ),
            priority: Priority::Medium,
            action: None,
        });
    }

    items.push(Recommendation {
        title: "Color calibration".to_string(),
        description: "Calibrate the monitor colors with an ICC profile for professional work."
            .to_string(),
        priority: Priority::Medium,
        action: Some(TestPattern::Calibration),
    });

    items.push(Recommendation {
        title: "Regular testing".to_string(),
        description: "Run the full monitor test once a month to keep it performing well."
            .to_string(),
        priority: Priority::Low,
        action: None,
    });

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(items: &[Recommendation]) -> Vec<&str> {
        items.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_low_rate_threshold() {
        let below = recommendations_for(349, 90);
        assert_eq!(below[0].title, "Low refresh rate");
        assert_eq!(below[0].priority, Priority::High);
        assert_eq!(below[0].action, Some(TestPattern::Fps));
        assert!(below[0].description.contains("349"));

        let at = recommendations_for(350, 90);
        assert!(!titles(&at).contains(&"Low refresh rate"));
    }

    #[test]
    fn test_low_quality_threshold() {
        let below = recommendations_for(390, 79);
        assert_eq!(below[0].title, "Quality below optimal");
        assert_eq!(below[0].priority, Priority::Medium);
        assert_eq!(below[0].action, None);

        let at = recommendations_for(390, 80);
        assert!(!titles(&at).contains(&"Quality below optimal"));
    }

    #[test]
    fn test_standing_items_always_last() {
        let healthy = recommendations_for(390, 100);
        assert_eq!(titles(&healthy), vec!["Color calibration", "Regular testing"]);
        assert_eq!(healthy[0].action, Some(TestPattern::Calibration));
        assert_eq!(healthy[1].priority, Priority::Low);

        let poor = recommendations_for(0, 28);
        assert_eq!(
            titles(&poor),
            vec![
                "Low refresh rate",
                "Quality below optimal",
                "Color calibration",
                "Regular testing"
            ]
        );
    }

    #[test]
    fn test_fresh_session_flags_low_rate_only() {
        // No samples yet: average 0, score still at its initial 100
        let items = recommendations(&Session::new());
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].priority, Priority::High);
    }

    #[test]
    fn test_priority_names() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
    }
}
