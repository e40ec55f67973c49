//! Tunable parameters for scoring, session aggregation, and alignment.
//!
//! All defaults are the production values; hosts can override any of them
//! and pass the structs down, the library performs no file or environment
//! loading itself.

use serde::{Deserialize, Serialize};

/// Frame Scorer parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Tolerance window for arm angles (degrees)
    pub arm_tolerance_deg: f64,

    /// Tolerance window for leg angles (degrees)
    pub leg_tolerance_deg: f64,

    /// Tolerance window for torso angles (degrees)
    pub torso_tolerance_deg: f64,

    /// Body-part weights in the overall combination; should sum to 1
    pub arm_weight: f64,
    pub leg_weight: f64,
    pub torso_weight: f64,

    /// Joints below this confidence are excluded from their part's average
    pub min_confidence: f64,

    /// No hint is produced when the weakest part scores at or above this
    pub hint_threshold: f64,

    /// A secondary hint is added when a second part scores below this
    pub secondary_hint_threshold: f64,

    /// Score smoothing factor for [`crate::scorer::ScoringEngine`], in [0, 1)
    pub score_smoothing: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            arm_tolerance_deg: 25.0,
            leg_tolerance_deg: 30.0,
            torso_tolerance_deg: 15.0,
            arm_weight: 0.35,
            leg_weight: 0.40,
            torso_weight: 0.25,
            min_confidence: 0.65,
            hint_threshold: 80.0,
            secondary_hint_threshold: 70.0,
            score_smoothing: 0.4,
        }
    }
}

/// Session Aggregator parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Overall scores below this open or extend a weak interval
    pub weak_threshold: u8,

    /// Sub-threshold samples within this many milliseconds of the open
    /// interval's end extend it; a larger gap closes it
    pub merge_tolerance_ms: i64,

    /// Intervals shorter than this are dropped as single-frame noise
    pub min_interval_ms: i64,

    /// Weak intervals reported, worst first
    pub max_reported_intervals: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            weak_threshold: 60,
            merge_tolerance_ms: 1000,
            min_interval_ms: 500,
            max_reported_intervals: 5,
        }
    }
}

/// Temporal Aligner parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignerConfig {
    /// Half-width of the offset search window (milliseconds)
    pub search_window_ms: i64,

    /// Candidate sampling step inside the search window (milliseconds)
    pub search_step_ms: i64,

    /// Offsets are only accepted when the best candidate scores at least
    /// this; below it the aligner reports offset 0 instead of a noisy guess
    pub acceptance_floor: u8,

    /// Buffered frames per performer (~2 s at the design cadence)
    pub buffer_capacity: usize,

    /// Half-width of the DTW diagonal band, in frames
    pub band_width: usize,

    /// Minimum interval between warp-path recomputations (milliseconds)
    pub recompute_interval_ms: i64,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            search_window_ms: 500,
            search_step_ms: 33,
            acceptance_floor: 70,
            buffer_capacity: 60,
            band_width: 10,
            recompute_interval_ms: 5000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let config = ScoringConfig::default();
        let sum = config.arm_weight + config.leg_weight + config.torso_weight;
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
