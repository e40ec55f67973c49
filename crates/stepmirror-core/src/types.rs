//! Fundamental types for the StepMirror system.

use chrono::{DateTime, Utc};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one training session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Timestamp wrapper with millisecond precision.
///
/// Timestamps come from the host's playback/capture clock; the core never
/// reads a wall clock on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Signed distance to another timestamp in milliseconds
    pub fn delta_ms(&self, other: Timestamp) -> i64 {
        self.0 - other.0
    }

    pub fn offset_ms(&self, millis: i64) -> Timestamp {
        Timestamp(self.0 + millis)
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0).unwrap_or_default()
    }
}

/// A single detected body point with position and confidence.
///
/// A landmark's identity is its position in the fixed 33-point layout of
/// [`PoseFrame::landmarks`]; see [`crate::landmarks::BodyLandmark`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Position in normalized image coordinates (0..1 on both axes)
    pub position: Point2<f64>,
    /// Relative depth, when the detector provides it
    pub depth: Option<f64>,
    /// Detector visibility/confidence in [0, 1]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self {
            position: Point2::new(x, y),
            depth: None,
            visibility,
        }
    }
}

/// One raw detection tick from the landmark source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub timestamp: Timestamp,
    /// Ordered per the fixed 33-point layout; shorter vectors are treated
    /// as frames with the trailing landmarks missing
    pub landmarks: Vec<Landmark>,
    /// Host-provided motion flag, when available
    pub is_moving: Option<bool>,
}

impl PoseFrame {
    pub fn new(timestamp: Timestamp, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp,
            landmarks,
            is_moving: None,
        }
    }
}

/// Values grouped by body part: 4 arm slots, 4 leg slots, 2 torso slots.
///
/// Replaces the implicit "first 4 / next 4 / last 2" slicing of a flat
/// 10-element vector, so a layout change cannot silently corrupt consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyParts<T> {
    pub arms: [T; 4],
    pub legs: [T; 4],
    pub torso: [T; 2],
}

impl<T> BodyParts<T> {
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.arms
            .iter()
            .chain(self.legs.iter())
            .chain(self.torso.iter())
    }
}

impl<T: Copy> BodyParts<T> {
    pub fn from_flat(values: [T; 10]) -> Self {
        Self {
            arms: [values[0], values[1], values[2], values[3]],
            legs: [values[4], values[5], values[6], values[7]],
            torso: [values[8], values[9]],
        }
    }

    pub fn to_flat(&self) -> [T; 10] {
        [
            self.arms[0],
            self.arms[1],
            self.arms[2],
            self.arms[3],
            self.legs[0],
            self.legs[1],
            self.legs[2],
            self.legs[3],
            self.torso[0],
            self.torso[1],
        ]
    }

    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> BodyParts<U> {
        let flat = self.to_flat();
        BodyParts::from_flat(std::array::from_fn(|i| f(flat[i])))
    }
}

impl<T: Copy + Default> BodyParts<T> {
    pub fn zeroed() -> Self {
        Self::from_flat([T::default(); 10])
    }
}

/// A pose reduced to its scale/position-invariant joint-angle form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPose {
    /// Joint angles in radians, each in [0, π]
    pub angles: BodyParts<f64>,
    /// Per-angle confidence in [0, 1]: the visibility of the angle's
    /// vertex landmark
    pub confidence: BodyParts<f64>,
    /// Hip midpoint in normalized image coordinates
    pub center: Point2<f64>,
    /// Torso length; 1.0 when the frame was too degenerate to measure
    pub scale: f64,
}

impl NormalizedPose {
    /// A pose with every angle and confidence at zero, used when a frame
    /// carries no usable landmarks at all.
    pub fn zeroed() -> Self {
        Self {
            angles: BodyParts::zeroed(),
            confidence: BodyParts::zeroed(),
            center: Point2::new(0.0, 0.0),
            scale: 1.0,
        }
    }
}
