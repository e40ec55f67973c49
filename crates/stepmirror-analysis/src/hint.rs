//! Correction hints: one actionable signal per scored frame.
//!
//! Hints are identifiers plus parameters, never display text; turning them
//! into localized strings is the presentation layer's job.

use serde::{Deserialize, Serialize};
use stepmirror_core::{angular_difference, BodyParts};

use crate::config::ScoringConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyPart {
    Arms,
    Legs,
    Torso,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Under/over-flexion classification, not full kinematic direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Live angle smaller than reference: open the joint further
    Extend,
    /// Live angle larger than reference: close the joint further
    Bend,
    /// Torso-only: restore lateral alignment
    Align,
}

/// How far off the offending joint is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Magnitude {
    /// Under 10 degrees
    Slight,
    /// Under 20 degrees
    Moderate,
    /// 20 degrees or more
    Major,
}

impl Magnitude {
    pub fn from_difference(diff_radians: f64) -> Self {
        let deg = diff_radians.to_degrees();
        if deg < 10.0 {
            Magnitude::Slight
        } else if deg < 20.0 {
            Magnitude::Moderate
        } else {
            Magnitude::Major
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub body_part: BodyPart,
    /// Which limb to correct; `None` for torso
    pub limb: Option<Side>,
    pub direction: Direction,
    pub magnitude: Magnitude,
}

/// Per-frame correction signal, at most two corrections deep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hint {
    /// The subject is doing well enough that feedback stays silent
    None,
    Single(Correction),
    Dual {
        primary: Correction,
        secondary: Correction,
    },
}

/// Select the hint for one scored frame.
///
/// The weakest body part wins; at or above the hint threshold no hint is
/// produced. For arms and legs the limb with the larger elbow/knee angular
/// difference is named. A secondary correction is attached when a second
/// body part also falls below the secondary threshold.
pub fn generate_hint(
    config: &ScoringConfig,
    live: &BodyParts<f64>,
    reference: &BodyParts<f64>,
    arms_score: f64,
    legs_score: f64,
    torso_score: f64,
) -> Hint {
    let mut ranked = [
        (BodyPart::Arms, arms_score),
        (BodyPart::Legs, legs_score),
        (BodyPart::Torso, torso_score),
    ];
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    let (weakest_part, weakest_score) = ranked[0];
    if weakest_score >= config.hint_threshold {
        return Hint::None;
    }

    let primary = correction_for(weakest_part, live, reference);

    let (second_part, second_score) = ranked[1];
    if second_score < config.secondary_hint_threshold {
        Hint::Dual {
            primary,
            secondary: correction_for(second_part, live, reference),
        }
    } else {
        Hint::Single(primary)
    }
}

fn correction_for(part: BodyPart, live: &BodyParts<f64>, reference: &BodyParts<f64>) -> Correction {
    match part {
        // Elbow-bend angles sit at arm slots 1 (left) and 3 (right)
        BodyPart::Arms => limb_correction(part, &live.arms, &reference.arms),
        // Knee-bend angles sit at leg slots 1 (left) and 3 (right)
        BodyPart::Legs => limb_correction(part, &live.legs, &reference.legs),
        BodyPart::Torso => {
            let diff = angular_difference(live.torso[0], reference.torso[0])
                .max(angular_difference(live.torso[1], reference.torso[1]));
            Correction {
                body_part: BodyPart::Torso,
                limb: None,
                direction: Direction::Align,
                magnitude: Magnitude::from_difference(diff),
            }
        }
    }
}

fn limb_correction(part: BodyPart, live: &[f64; 4], reference: &[f64; 4]) -> Correction {
    let left_diff = angular_difference(live[1], reference[1]);
    let right_diff = angular_difference(live[3], reference[3]);

    let (side, slot, diff) = if left_diff > right_diff {
        (Side::Left, 1, left_diff)
    } else {
        (Side::Right, 3, right_diff)
    };

    let direction = if live[slot] < reference[slot] {
        Direction::Extend
    } else {
        Direction::Bend
    };

    Correction {
        body_part: part,
        limb: Some(side),
        direction,
        magnitude: Magnitude::from_difference(diff),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angles(value: f64) -> BodyParts<f64> {
        BodyParts::from_flat([value; 10])
    }

    #[test]
    fn test_silent_when_scores_are_good() {
        let config = ScoringConfig::default();
        let pose = angles(1.5);

        let hint = generate_hint(&config, &pose, &pose, 85.0, 92.0, 80.0);
        assert_eq!(hint, Hint::None);
    }

    #[test]
    fn test_picks_limb_with_larger_difference() {
        let config = ScoringConfig::default();
        let reference = angles(1.5);
        let mut live = reference;
        live.arms[1] = 1.0; // left elbow off by 0.5 rad
        live.arms[3] = 1.4; // right elbow off by 0.1 rad

        let hint = generate_hint(&config, &live, &reference, 50.0, 90.0, 90.0);
        match hint {
            Hint::Single(c) => {
                assert_eq!(c.body_part, BodyPart::Arms);
                assert_eq!(c.limb, Some(Side::Left));
                // live < reference: the elbow needs extending
                assert_eq!(c.direction, Direction::Extend);
                assert_eq!(c.magnitude, Magnitude::Major);
            }
            other => panic!("expected single arm hint, got {other:?}"),
        }
    }

    #[test]
    fn test_bend_direction_when_overflexed() {
        let config = ScoringConfig::default();
        let reference = angles(1.5);
        let mut live = reference;
        live.legs[3] = 1.8; // right knee opened too far

        let hint = generate_hint(&config, &live, &reference, 90.0, 55.0, 90.0);
        match hint {
            Hint::Single(c) => {
                assert_eq!(c.body_part, BodyPart::Legs);
                assert_eq!(c.limb, Some(Side::Right));
                assert_eq!(c.direction, Direction::Bend);
            }
            other => panic!("expected single leg hint, got {other:?}"),
        }
    }

    #[test]
    fn test_torso_hint_has_no_side() {
        let config = ScoringConfig::default();
        let reference = angles(1.5);
        let mut live = reference;
        live.torso[0] = 1.2;

        let hint = generate_hint(&config, &live, &reference, 90.0, 90.0, 40.0);
        match hint {
            Hint::Single(c) => {
                assert_eq!(c.body_part, BodyPart::Torso);
                assert_eq!(c.limb, None);
                assert_eq!(c.direction, Direction::Align);
            }
            other => panic!("expected torso hint, got {other:?}"),
        }
    }

    #[test]
    fn test_secondary_hint_below_seventy() {
        let config = ScoringConfig::default();
        let reference = angles(1.5);
        let mut live = reference;
        live.arms[1] = 1.0;
        live.legs[1] = 1.2;

        let hint = generate_hint(&config, &live, &reference, 45.0, 65.0, 90.0);
        match hint {
            Hint::Dual { primary, secondary } => {
                assert_eq!(primary.body_part, BodyPart::Arms);
                assert_eq!(secondary.body_part, BodyPart::Legs);
            }
            other => panic!("expected dual hint, got {other:?}"),
        }
    }

    #[test]
    fn test_no_secondary_at_exactly_seventy() {
        let config = ScoringConfig::default();
        let reference = angles(1.5);
        let mut live = reference;
        live.arms[1] = 1.0;

        let hint = generate_hint(&config, &live, &reference, 45.0, 70.0, 90.0);
        assert!(matches!(hint, Hint::Single(_)));
    }

    #[test]
    fn test_magnitude_tiers() {
        assert_eq!(
            Magnitude::from_difference(5.0_f64.to_radians()),
            Magnitude::Slight
        );
        assert_eq!(
            Magnitude::from_difference(15.0_f64.to_radians()),
            Magnitude::Moderate
        );
        assert_eq!(
            Magnitude::from_difference(25.0_f64.to_radians()),
            Magnitude::Major
        );
    }
}
