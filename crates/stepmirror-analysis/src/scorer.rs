//! Frame scoring: tolerance-aware, confidence-weighted comparison of two
//! normalized poses.

use serde::{Deserialize, Serialize};
use stepmirror_core::{angular_difference, NormalizedPose};
use std::f64::consts::PI;

use crate::config::ScoringConfig;
use crate::hint::{generate_hint, Hint};

/// Per-body-part scores, each in 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyPartScores {
    pub arms: u8,
    pub legs: u8,
    pub torso: u8,
}

impl BodyPartScores {
    pub fn zeroed() -> Self {
        Self {
            arms: 0,
            legs: 0,
            torso: 0,
        }
    }
}

/// Result of comparing one live frame against one reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameScoreResult {
    /// Weighted combination of the three body-part scores, 0..=100
    pub overall: u8,
    /// Timeline offset in effect for this comparison; 0 when unknown.
    /// Negative means the live subject is behind the reference.
    pub timing_offset_ms: i64,
    pub body_parts: BodyPartScores,
    pub hint: Hint,
}

/// Score a single angular difference against a tolerance window.
///
/// Inside the window the penalty is a shallow linear ramp from 100 down to
/// 85, so natural motion variance barely registers; outside it the score
/// falls off exponentially toward 0.
pub fn angle_score(diff: f64, tolerance: f64) -> f64 {
    if diff <= tolerance {
        return 100.0 - (diff / tolerance) * 15.0;
    }

    let ratio = ((diff - tolerance) / (PI - tolerance)).min(1.0);
    (85.0 * (1.0 - ratio).powf(1.5)).max(0.0)
}

/// Confidence-squared weighted score for one body part's angle slots.
///
/// Joints below `min_confidence` are excluded outright, not down-weighted;
/// `None` when nothing qualified (distinguishes "no usable data" from a
/// genuine zero score).
fn part_score(
    live: &[f64],
    reference: &[f64],
    confidence: &[f64],
    tolerance: f64,
    min_confidence: f64,
) -> Option<f64> {
    let mut total = 0.0;
    let mut weight = 0.0;

    for i in 0..live.len() {
        let conf = confidence[i];
        if conf < min_confidence {
            continue;
        }

        let diff = angular_difference(live[i], reference[i]);
        let w = conf * conf;
        total += angle_score(diff, tolerance) * w;
        weight += w;
    }

    if weight > 0.0 {
        Some(total / weight)
    } else {
        None
    }
}

fn round_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

/// Compare a live pose against a reference pose.
///
/// Pure function; `timing_offset_ms` is carried through verbatim so the
/// presentation layer can show which timeline correction was in effect.
/// Frames whose joints all fall below the confidence floor score 0 with no
/// hint rather than failing.
pub fn compare_frames(
    config: &ScoringConfig,
    live: &NormalizedPose,
    reference: &NormalizedPose,
    timing_offset_ms: i64,
) -> FrameScoreResult {
    let conf = &live.confidence;

    let arms = part_score(
        &live.angles.arms,
        &reference.angles.arms,
        &conf.arms,
        config.arm_tolerance_deg.to_radians(),
        config.min_confidence,
    );
    let legs = part_score(
        &live.angles.legs,
        &reference.angles.legs,
        &conf.legs,
        config.leg_tolerance_deg.to_radians(),
        config.min_confidence,
    );
    let torso = part_score(
        &live.angles.torso,
        &reference.angles.torso,
        &conf.torso,
        config.torso_tolerance_deg.to_radians(),
        config.min_confidence,
    );

    let body_parts = BodyPartScores {
        arms: round_score(arms.unwrap_or(0.0)),
        legs: round_score(legs.unwrap_or(0.0)),
        torso: round_score(torso.unwrap_or(0.0)),
    };

    let overall = round_score(
        body_parts.arms as f64 * config.arm_weight
            + body_parts.legs as f64 * config.leg_weight
            + body_parts.torso as f64 * config.torso_weight,
    );

    // No usable joints anywhere means there is nothing to correct
    let hint = if arms.is_none() && legs.is_none() && torso.is_none() {
        Hint::None
    } else {
        generate_hint(
            config,
            &live.angles,
            &reference.angles,
            body_parts.arms as f64,
            body_parts.legs as f64,
            body_parts.torso as f64,
        )
    };

    FrameScoreResult {
        overall,
        timing_offset_ms,
        body_parts,
        hint,
    }
}

/// Stateful scorer that smooths displayed scores across frames.
///
/// Raw per-frame scores jitter with detector noise; an exponential filter
/// keeps the on-screen number steady without changing the hint selection.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    prev: Option<FrameScoreResult>,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config, prev: None }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn compare(
        &mut self,
        live: &NormalizedPose,
        reference: &NormalizedPose,
        timing_offset_ms: i64,
    ) -> FrameScoreResult {
        let mut result = compare_frames(&self.config, live, reference, timing_offset_ms);

        if let Some(prev) = self.prev {
            let s = self.config.score_smoothing;
            let blend =
                |old: u8, new: u8| round_score(s * old as f64 + (1.0 - s) * new as f64);

            result.overall = blend(prev.overall, result.overall);
            result.body_parts = BodyPartScores {
                arms: blend(prev.body_parts.arms, result.body_parts.arms),
                legs: blend(prev.body_parts.legs, result.body_parts.legs),
                torso: blend(prev.body_parts.torso, result.body_parts.torso),
            };
        }

        self.prev = Some(result);
        result
    }

    /// Clear smoothing state; call when a new session starts
    pub fn reset(&mut self) {
        self.prev = None;
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepmirror_core::BodyParts;

    fn pose(angles: [f64; 10], confidence: [f64; 10]) -> NormalizedPose {
        NormalizedPose {
            angles: BodyParts::from_flat(angles),
            confidence: BodyParts::from_flat(confidence),
            ..NormalizedPose::zeroed()
        }
    }

    fn full_confidence_pose(angles: [f64; 10]) -> NormalizedPose {
        pose(angles, [1.0; 10])
    }

    #[test]
    fn test_self_compare_is_perfect() {
        let config = ScoringConfig::default();
        let p = full_confidence_pose([1.1, 2.3, 0.4, 1.9, 2.8, 0.2, 1.0, 1.5, 0.7, 0.9]);

        let result = compare_frames(&config, &p, &p, 0);
        assert_eq!(result.overall, 100);
        assert_eq!(result.body_parts.arms, 100);
        assert_eq!(result.body_parts.legs, 100);
        assert_eq!(result.body_parts.torso, 100);
        assert_eq!(result.hint, Hint::None);
    }

    #[test]
    fn test_tolerance_curve_endpoints() {
        let tolerance = 25.0_f64.to_radians();
        assert!((angle_score(0.0, tolerance) - 100.0).abs() < 1e-9);
        assert!((angle_score(tolerance, tolerance) - 85.0).abs() < 1e-9);
        assert_eq!(angle_score(PI, tolerance), 0.0);
    }

    #[test]
    fn test_tolerance_curve_monotone() {
        let tolerance = 30.0_f64.to_radians();
        let mut prev = f64::INFINITY;
        for step in 0..=300 {
            let diff = PI * step as f64 / 300.0;
            let score = angle_score(diff, tolerance);
            assert!(
                score <= prev + 1e-12,
                "score increased at diff={diff}: {score} > {prev}"
            );
            prev = score;
        }
    }

    #[test]
    fn test_low_confidence_joint_has_no_influence() {
        let config = ScoringConfig::default();
        let reference = full_confidence_pose([1.5; 10]);

        let mut confidence = [1.0; 10];
        confidence[1] = 0.6; // left elbow, just under the floor

        let baseline = pose([1.5; 10], confidence);
        let mut perturbed_angles = [1.5; 10];
        perturbed_angles[1] = 0.1; // wildly wrong, but unreliable
        let perturbed = pose(perturbed_angles, confidence);

        let a = compare_frames(&config, &baseline, &reference, 0);
        let b = compare_frames(&config, &perturbed, &reference, 0);
        assert_eq!(a.body_parts, b.body_parts);
        assert_eq!(a.overall, b.overall);
    }

    #[test]
    fn test_confidence_squared_weighting() {
        let config = ScoringConfig::default();
        let reference = full_confidence_pose([1.5; 10]);

        // Two arm joints included: one perfect at confidence 0.7, one off
        // at confidence 1.0. All other arm joints excluded.
        let mut confidence = [0.0; 10];
        confidence[0] = 0.7;
        confidence[1] = 1.0;
        let mut angles = [1.5; 10];
        angles[1] = 1.5 + config.arm_tolerance_deg.to_radians(); // scores 85
        let live = pose(angles, confidence);

        let result = compare_frames(&config, &live, &reference, 0);
        let expected: f64 = (100.0 * 0.49 + 85.0 * 1.0) / (0.49 + 1.0);
        assert_eq!(result.body_parts.arms, expected.round() as u8);
    }

    #[test]
    fn test_overall_weight_identity() {
        let config = ScoringConfig::default();
        let reference = full_confidence_pose([1.2; 10]);
        let live = full_confidence_pose([1.6, 0.8, 1.1, 2.0, 1.2, 1.4, 0.9, 1.3, 1.0, 1.7]);

        let result = compare_frames(&config, &live, &reference, 0);
        let expected = (result.body_parts.arms as f64 * 0.35
            + result.body_parts.legs as f64 * 0.40
            + result.body_parts.torso as f64 * 0.25)
            .round() as u8;
        assert_eq!(result.overall, expected);
    }

    #[test]
    fn test_all_confidence_below_floor_scores_zero_without_hint() {
        let config = ScoringConfig::default();
        let reference = full_confidence_pose([1.5; 10]);
        let live = pose([1.5; 10], [0.0; 10]);

        let result = compare_frames(&config, &live, &reference, 0);
        assert_eq!(result.overall, 0);
        assert_eq!(result.body_parts, BodyPartScores::zeroed());
        assert_eq!(result.hint, Hint::None);
    }

    #[test]
    fn test_timing_offset_passthrough() {
        let config = ScoringConfig::default();
        let p = full_confidence_pose([1.0; 10]);

        let result = compare_frames(&config, &p, &p, -180);
        assert_eq!(result.timing_offset_ms, -180);
    }

    #[test]
    fn test_engine_smooths_scores() {
        let mut engine = ScoringEngine::default();
        let reference = full_confidence_pose([1.5; 10]);
        let perfect = reference;
        let off = full_confidence_pose([0.2; 10]);

        let first = engine.compare(&perfect, &reference, 0);
        assert_eq!(first.overall, 100);

        // The raw second score is far lower; smoothing keeps 40% of the
        // previous value
        let second = engine.compare(&off, &reference, 0);
        let raw = compare_frames(engine.config(), &off, &reference, 0);
        let expected = (0.4 * 100.0 + 0.6 * raw.overall as f64).round() as u8;
        assert_eq!(second.overall, expected);
    }

    #[test]
    fn test_engine_reset_clears_smoothing() {
        let mut engine = ScoringEngine::default();
        let reference = full_confidence_pose([1.5; 10]);
        let off = full_confidence_pose([0.2; 10]);

        engine.compare(&off, &reference, 0);
        engine.reset();

        let result = engine.compare(&reference, &reference, 0);
        assert_eq!(result.overall, 100);
    }
}
