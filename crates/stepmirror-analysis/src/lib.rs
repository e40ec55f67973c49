//! # StepMirror Analysis
//!
//! The comparison pipeline of the StepMirror dance training core:
//!
//! 1. **Frame Scorer** — tolerance-aware, confidence-weighted comparison of
//!    two normalized poses into per-body-part and overall scores plus one
//!    actionable correction hint.
//! 2. **Session Aggregator** — accumulates per-frame scores into summary
//!    statistics and a ranked report of weak time intervals.
//! 3. **Temporal Aligner** — maps live timeline positions onto the
//!    reference timeline via local offset search or bounded dynamic time
//!    warping, so the scorer is fed the right reference frame when the two
//!    performers are not wall-clock synchronized.
//!
//! Everything is single-threaded and call-and-return; the host invokes the
//! pipeline at its own cadence.

pub mod align;
pub mod config;
pub mod hint;
pub mod scorer;
pub mod session;

pub use align::*;
pub use config::*;
pub use hint::*;
pub use scorer::*;
pub use session::*;
