//! Landmark normalization: raw frames to joint-angle poses.

use nalgebra::Point2;

use crate::geometry::joint_angle;
use crate::landmarks::{landmark, BodyLandmark, ANGLE_DEFINITIONS};
use crate::types::{BodyParts, Landmark, NormalizedPose, PoseFrame};

/// Convert a raw landmark frame into its scale/position-invariant
/// joint-angle form.
///
/// Missing landmarks degrade the affected angle to 0 with confidence 0;
/// this never fails on malformed-but-well-typed input. `mirror` reflects
/// x-coordinates (`x' = 1 - x`) before angle computation, for live feeds
/// that are horizontally flipped for display.
pub fn normalize(frame: &PoseFrame, mirror: bool) -> NormalizedPose {
    if frame.landmarks.is_empty() {
        return NormalizedPose::zeroed();
    }

    let mirrored;
    let landmarks: &[Landmark] = if mirror {
        mirrored = frame
            .landmarks
            .iter()
            .map(|lm| Landmark {
                position: Point2::new(1.0 - lm.position.x, lm.position.y),
                ..*lm
            })
            .collect::<Vec<_>>();
        &mirrored
    } else {
        &frame.landmarks
    };

    let center = midpoint(landmarks, BodyLandmark::LeftHip, BodyLandmark::RightHip)
        .unwrap_or_else(|| Point2::new(0.0, 0.0));

    // Torso length: hip midpoint to shoulder midpoint. Falls back to 1.0
    // when degenerate so downstream division never explodes.
    let scale = midpoint(
        landmarks,
        BodyLandmark::LeftShoulder,
        BodyLandmark::RightShoulder,
    )
    .map(|shoulder_center| (shoulder_center - center).norm())
    .filter(|torso_length| *torso_length > 0.0)
    .unwrap_or(1.0);

    let mut angles = [0.0; 10];
    let mut confidence = [0.0; 10];
    for (i, def) in ANGLE_DEFINITIONS.iter().enumerate() {
        let joint = landmark(landmarks, def.joint);
        let parent = landmark(landmarks, def.parent);
        let child = landmark(landmarks, def.child);

        if let (Some(joint), Some(parent), Some(child)) = (joint, parent, child) {
            angles[i] = joint_angle(parent.position, joint.position, child.position);
            confidence[i] = joint.visibility;
        }
    }

    NormalizedPose {
        angles: BodyParts::from_flat(angles),
        confidence: BodyParts::from_flat(confidence),
        center,
        scale,
    }
}

fn midpoint(landmarks: &[Landmark], left: BodyLandmark, right: BodyLandmark) -> Option<Point2<f64>> {
    let l = landmark(landmarks, left)?;
    let r = landmark(landmarks, right)?;
    Some(Point2::new(
        (l.position.x + r.position.x) / 2.0,
        (l.position.y + r.position.y) / 2.0,
    ))
}

/// Stateful normalizer that smooths angles across consecutive frames.
///
/// Detector jitter makes raw angles noisy tick to tick; an exponential
/// filter keeps the rendered skeleton and the scores steadier. Call
/// [`PoseNormalizer::reset`] when a new session starts so the first frame
/// of one take is not blended with the last frame of the previous one.
#[derive(Debug, Clone)]
pub struct PoseNormalizer {
    smoothing_factor: f64,
    prev_angles: Option<BodyParts<f64>>,
}

impl PoseNormalizer {
    /// `smoothing_factor` in [0, 1); higher keeps more of the previous frame
    pub fn new(smoothing_factor: f64) -> Self {
        Self {
            smoothing_factor,
            prev_angles: None,
        }
    }

    pub fn normalize(&mut self, frame: &PoseFrame, mirror: bool) -> NormalizedPose {
        let mut pose = normalize(frame, mirror);

        if let Some(prev) = self.prev_angles {
            let s = self.smoothing_factor;
            let prev_flat = prev.to_flat();
            let cur_flat = pose.angles.to_flat();
            pose.angles = BodyParts::from_flat(std::array::from_fn(|i| {
                s * prev_flat[i] + (1.0 - s) * cur_flat[i]
            }));
        }

        self.prev_angles = Some(pose.angles);
        pose
    }

    pub fn reset(&mut self) {
        self.prev_angles = None;
    }
}

impl Default for PoseNormalizer {
    fn default() -> Self {
        Self::new(0.3)
    }
}
