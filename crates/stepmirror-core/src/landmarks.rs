//! The fixed 33-point body-landmark layout and the joint-angle table.
//!
//! Indices follow the detector's layout: 0 nose, 1-10 face, 11-12
//! shoulders, 13-14 elbows, 15-16 wrists, 17-22 hands, 23-24 hips, 25-26
//! knees, 27-28 ankles, 29-32 feet. The core only reads the 12 landmarks
//! covering arms, legs, and torso.

use serde::{Deserialize, Serialize};

use crate::types::{Landmark, PoseFrame};

/// Total landmarks in the detector's layout
pub const LANDMARK_COUNT: usize = 33;

/// Number of joint angles derived from a frame
pub const ANGLE_COUNT: usize = 10;

/// The body landmarks this core reads, named by their layout index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum BodyLandmark {
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
}

impl BodyLandmark {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One joint angle: the angle at `joint` between the bones toward
/// `parent` and `child`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleDefinition {
    pub joint: BodyLandmark,
    pub parent: BodyLandmark,
    pub child: BodyLandmark,
}

const fn def(joint: BodyLandmark, parent: BodyLandmark, child: BodyLandmark) -> AngleDefinition {
    AngleDefinition {
        joint,
        parent,
        child,
    }
}

/// The ten joint angles in arms(4) / legs(4) / torso(2) order.
///
/// Arms: shoulder-open and elbow-bend, left then right. Legs: hip-open and
/// knee-bend, left then right. Torso: each shoulder against the opposite
/// shoulder/hip triangle, for lateral lean.
pub const ANGLE_DEFINITIONS: [AngleDefinition; ANGLE_COUNT] = [
    def(
        BodyLandmark::LeftShoulder,
        BodyLandmark::LeftHip,
        BodyLandmark::LeftElbow,
    ),
    def(
        BodyLandmark::LeftElbow,
        BodyLandmark::LeftShoulder,
        BodyLandmark::LeftWrist,
    ),
    def(
        BodyLandmark::RightShoulder,
        BodyLandmark::RightHip,
        BodyLandmark::RightElbow,
    ),
    def(
        BodyLandmark::RightElbow,
        BodyLandmark::RightShoulder,
        BodyLandmark::RightWrist,
    ),
    def(
        BodyLandmark::LeftHip,
        BodyLandmark::LeftShoulder,
        BodyLandmark::LeftKnee,
    ),
    def(
        BodyLandmark::LeftKnee,
        BodyLandmark::LeftHip,
        BodyLandmark::LeftAnkle,
    ),
    def(
        BodyLandmark::RightHip,
        BodyLandmark::RightShoulder,
        BodyLandmark::RightKnee,
    ),
    def(
        BodyLandmark::RightKnee,
        BodyLandmark::RightHip,
        BodyLandmark::RightAnkle,
    ),
    def(
        BodyLandmark::LeftShoulder,
        BodyLandmark::LeftHip,
        BodyLandmark::RightShoulder,
    ),
    def(
        BodyLandmark::RightShoulder,
        BodyLandmark::RightHip,
        BodyLandmark::LeftShoulder,
    ),
];

/// Visibility floor for counting a landmark toward frame validity
const VALID_VISIBILITY: f64 = 0.5;

/// Minimum visible landmarks for a frame worth normalizing
const VALID_LANDMARK_COUNT: usize = 15;

impl PoseFrame {
    /// Whether enough of the body was detected to be worth scoring.
    ///
    /// Frames failing this check may still be normalized; every affected
    /// angle simply degrades to zero confidence.
    pub fn is_valid(&self) -> bool {
        let visible = self
            .landmarks
            .iter()
            .filter(|lm| lm.visibility > VALID_VISIBILITY)
            .count();
        visible >= VALID_LANDMARK_COUNT
    }
}

/// Fetch a landmark by layout id, `None` when the frame is too short.
pub fn landmark(landmarks: &[Landmark], id: BodyLandmark) -> Option<&Landmark> {
    landmarks.get(id.index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Landmark, PoseFrame, Timestamp};

    fn frame_with_visibility(count: usize, visibility: f64) -> PoseFrame {
        let landmarks = (0..count)
            .map(|i| Landmark::new(i as f64 * 0.01, 0.5, visibility))
            .collect();
        PoseFrame::new(Timestamp::from_millis(0), landmarks)
    }

    #[test]
    fn test_angle_table_layout() {
        assert_eq!(ANGLE_DEFINITIONS.len(), ANGLE_COUNT);
        // Elbow-bend angles sit at arm slots 1 and 3
        assert_eq!(ANGLE_DEFINITIONS[1].joint, BodyLandmark::LeftElbow);
        assert_eq!(ANGLE_DEFINITIONS[3].joint, BodyLandmark::RightElbow);
        // Knee-bend angles sit at leg slots 1 and 3 (flat indices 5 and 7)
        assert_eq!(ANGLE_DEFINITIONS[5].joint, BodyLandmark::LeftKnee);
        assert_eq!(ANGLE_DEFINITIONS[7].joint, BodyLandmark::RightKnee);
    }

    #[test]
    fn test_frame_validity() {
        assert!(frame_with_visibility(LANDMARK_COUNT, 0.9).is_valid());
        assert!(!frame_with_visibility(LANDMARK_COUNT, 0.2).is_valid());
        assert!(!frame_with_visibility(5, 0.9).is_valid());
    }

    #[test]
    fn test_landmark_lookup_out_of_range() {
        let frame = frame_with_visibility(10, 0.9);
        assert!(landmark(&frame.landmarks, BodyLandmark::LeftShoulder).is_none());
    }
}
