//! # StepMirror Core
//!
//! Fundamental types and pose normalization for the StepMirror dance
//! training core: a fixed 33-point body-landmark layout, joint-angle
//! geometry, and the normalizer that turns raw landmark frames into a
//! scale- and position-invariant joint-angle representation.
//!
//! Landmark detection itself is an external collaborator; this crate only
//! consumes its output and treats it as noisy.

pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod normalize;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use landmarks::*;
pub use normalize::*;
pub use types::*;
