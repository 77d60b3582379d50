//! Session quality score.
//!
//! The score is a sequential blend into an accumulator seeded at 100: each
//! stage mixes its sub-score into the already-blended value, so the stage
//! order is part of the result.

use serde::{Deserialize, Serialize};

/// Refresh rate the tester is calibrated for.
pub const TARGET_RATE: u32 = 390;

/// Number of screen tests that make up a full run.
pub const TOTAL_TESTS: u32 = 15;

/// Minimum number of recent samples before the stability stage applies.
const STABILITY_MIN_SAMPLES: usize = 10;

/// Compute the quality score in `[0, 100]`.
///
/// `recent` is the tail of the reading history (at most the last 100
/// samples); the stability stage is skipped unless it holds more than 10.
pub fn compute_score(avg_rate: u32, recent: &[u32], tests_completed: u32) -> u8 {
    let mut score = 100.0_f64;

    let rate_score = (f64::from(avg_rate) / f64::from(TARGET_RATE) * 100.0).min(100.0);
    score = score * 0.4 + rate_score * 0.4;

    if recent.len() > STABILITY_MIN_SAMPLES {
        let spread = std_deviation(recent);
        let stability_score = (100.0 - spread).max(0.0);
        score = score * 0.7 + stability_score * 0.3;
    }

    let tests_score = (f64::from(tests_completed) / f64::from(TOTAL_TESTS) * 100.0).min(100.0);
    score = score * 0.7 + tests_score * 0.3;

    score.clamp(0.0, 100.0).round() as u8
}

/// Population standard deviation, 0 for an empty slice.
pub fn std_deviation(samples: &[u32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
    let sum_sq: f64 = samples
        .iter()
        .map(|&s| {
            let d = f64::from(s) - mean;
            d * d
        })
        .sum();
    (sum_sq / n).sqrt()
}

/// Coarse rating of a quality score, used for colouring and the quality glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Excellent,
    Fair,
    Poor,
}

impl QualityTier {
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            QualityTier::Excellent
        } else if score >= 70 {
            QualityTier::Fair
        } else {
            QualityTier::Poor
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "#00ff88",
            QualityTier::Fair => "#ffaa00",
            QualityTier::Poor => "#ff4444",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "↑",
            QualityTier::Fair => "→",
            QualityTier::Poor => "↓",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_perfect_run_without_stability_stage() {
        // 100*0.4 + 100*0.4 = 80, then 80*0.7 + 100*0.3 = 86
        assert_eq!(compute_score(390, &[], 15), 86);
    }

    #[test]
    fn test_fresh_session() {
        // 100*0.4 + 0 = 40, then 40*0.7 + 0 = 28
        assert_eq!(compute_score(0, &[], 0), 28);
    }

    #[test]
    fn test_rate_score_is_capped() {
        assert_eq!(compute_score(1000, &[], 15), compute_score(390, &[], 15));
    }

    #[test]
    fn test_tests_score_is_capped() {
        assert_eq!(compute_score(390, &[], 40), compute_score(390, &[], 15));
    }

    #[test]
    fn test_stability_stage_requires_more_than_ten_samples() {
        let ten = [0u32, 1000, 0, 1000, 0, 1000, 0, 1000, 0, 1000];
        assert_eq!(compute_score(390, &ten, 15), 86);

        let eleven = [390u32; 11];
        // 80*0.7 + 100*0.3 = 86, then 86*0.7 + 100*0.3 = 90.2
        assert_eq!(compute_score(390, &eleven, 15), 90);
    }

    #[test]
    fn test_unstable_samples_lower_the_score() {
        let noisy: Vec<u32> = (0..100).map(|i| if i % 2 == 0 { 0 } else { 780 }).collect();
        // std-dev 390 floors stability at 0: 80*0.7 = 56, then 56*0.7 + 30 = 69.2
        assert_eq!(compute_score(390, &noisy, 15), 69);
    }

    #[test]
    fn test_std_deviation() {
        assert_eq!(std_deviation(&[]), 0.0);
        assert_eq!(std_deviation(&[5, 5, 5]), 0.0);
        assert!((std_deviation(&[2, 4, 4, 4, 5, 5, 7, 9]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_quality_tiers() {
        assert_eq!(QualityTier::from_score(100), QualityTier::Excellent);
        assert_eq!(QualityTier::from_score(90), QualityTier::Excellent);
        assert_eq!(QualityTier::from_score(89), QualityTier::Fair);
        assert_eq!(QualityTier::from_score(70), QualityTier::Fair);
        assert_eq!(QualityTier::from_score(69), QualityTier::Poor);
        assert_eq!(QualityTier::Poor.glyph(), "↓");
        assert_eq!(QualityTier::Excellent.color(), "#00ff88");
    }

    proptest! {
        #[test]
        fn prop_score_is_bounded(
            avg_rate in any::<u32>(),
            recent in prop::collection::vec(any::<u32>(), 0..120),
            tests_completed in any::<u32>(),
        ) {
            let score = compute_score(avg_rate, &recent, tests_completed);
            prop_assert!(score <= 100);
        }

        #[test]
        fn prop_more_tests_never_lower_score(
            avg_rate in 0u32..800u32,
            recent in prop::collection::vec(0u32..800u32, 0..120),
            tests_completed in 0u32..30u32,
        ) {
            let before = compute_score(avg_rate, &recent, tests_completed);
            let after = compute_score(avg_rate, &recent, tests_completed + 1);
            prop_assert!(after >= before);
        }
    }
}
