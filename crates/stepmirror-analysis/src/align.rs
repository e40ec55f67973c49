//! Temporal alignment: mapping live timeline positions onto the reference
//! timeline when the two performers are not wall-clock synchronized.
//!
//! Two strategies, escalating in cost. Strategy A searches a small window
//! around the current live timestamp for the best-scoring reference frame
//! and reports a single signed offset. Strategy B runs a banded
//! dynamic-time-warping pass over the buffered recent frames of both
//! performers and keeps the resulting monotone warp path; it is throttled
//! to a low recompute cadence because even the banded pass is too costly
//! per tick.
//!
//! Neither strategy is consulted by the scorer itself: the host calls
//! [`TemporalAligner::reference_timestamp_for`] before `compare_frames` to
//! pick the reference frame, and gets the wall-clock identity back when no
//! alignment has been accepted yet.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use stepmirror_core::{angular_difference, Error, NormalizedPose, Result, Timestamp};

use crate::config::{AlignerConfig, ScoringConfig};
use crate::scorer::compare_frames;

/// Radius for snapping a timestamp to the nearest buffered frame
const NEAREST_FRAME_RADIUS_MS: i64 = 100;

#[derive(Debug, Clone, Copy)]
struct BufferedFrame {
    timestamp: Timestamp,
    pose: NormalizedPose,
}

/// Bounded, timestamp-ordered ring of recent frames for one performer.
#[derive(Debug, Clone)]
struct FrameRing {
    capacity: usize,
    frames: VecDeque<BufferedFrame>,
}

impl FrameRing {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            frames: VecDeque::with_capacity(capacity),
        }
    }

    fn push(&mut self, timestamp: Timestamp, pose: NormalizedPose) -> Result<()> {
        if let Some(last) = self.frames.back() {
            if timestamp < last.timestamp {
                return Err(Error::OutOfOrderTimestamp {
                    previous_ms: last.timestamp.as_millis(),
                    received_ms: timestamp.as_millis(),
                });
            }
        }

        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(BufferedFrame { timestamp, pose });
        Ok(())
    }

    /// Closest frame to `ts` within the snap radius.
    fn nearest(&self, ts: Timestamp) -> Option<&BufferedFrame> {
        self.frames
            .iter()
            .min_by_key(|f| f.timestamp.delta_ms(ts).abs())
            .filter(|f| f.timestamp.delta_ms(ts).abs() <= NEAREST_FRAME_RADIUS_MS)
    }

    fn len(&self) -> usize {
        self.frames.len()
    }

    fn clear(&mut self) {
        self.frames.clear();
    }
}

/// One correspondence on the warp path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarpStep {
    pub live: Timestamp,
    pub reference: Timestamp,
}

/// A monotone live→reference mapping produced by the banded DTW pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarpPath {
    pub steps: Vec<WarpStep>,
    pub computed_at: Timestamp,
}

/// Estimates how far the live subject leads or lags the reference.
#[derive(Debug, Clone)]
pub struct TemporalAligner {
    config: AlignerConfig,
    scoring: ScoringConfig,
    live: FrameRing,
    reference: FrameRing,
    accepted_offset_ms: Option<i64>,
    path: Option<WarpPath>,
}

impl TemporalAligner {
    pub fn new(config: AlignerConfig, scoring: ScoringConfig) -> Self {
        let capacity = config.buffer_capacity;
        Self {
            config,
            scoring,
            live: FrameRing::new(capacity),
            reference: FrameRing::new(capacity),
            accepted_offset_ms: None,
            path: None,
        }
    }

    /// Buffer one live frame. Timestamps must be non-decreasing.
    pub fn push_live(&mut self, timestamp: Timestamp, pose: NormalizedPose) -> Result<()> {
        self.live.push(timestamp, pose)
    }

    /// Buffer one reference frame. Timestamps must be non-decreasing.
    pub fn push_reference(&mut self, timestamp: Timestamp, pose: NormalizedPose) -> Result<()> {
        self.reference.push(timestamp, pose)
    }

    pub fn last_accepted_offset_ms(&self) -> Option<i64> {
        self.accepted_offset_ms
    }

    pub fn warp_path(&self) -> Option<&WarpPath> {
        self.path.as_ref()
    }

    /// Strategy A: local offset search.
    ///
    /// Scores the live frame at `live_ts` against reference frames sampled
    /// across the search window and returns the signed offset to the best
    /// match, negative meaning the live subject is behind the reference.
    /// Ties go to the candidate closest to zero offset, so self-similar
    /// motion such as a held pose never drifts toward the window edge.
    /// When the best candidate does not clear the acceptance floor the
    /// search reports 0 instead of a noisy guess; the previously accepted
    /// offset, if any, stays in effect for lookups.
    pub fn estimate_offset(&mut self, live_ts: Timestamp) -> i64 {
        let Some(live_frame) = self.live.nearest(live_ts).copied() else {
            return 0;
        };

        let mut best: Option<(u8, i64)> = None;
        let mut candidate_ms = live_ts.as_millis() - self.config.search_window_ms;
        let window_end_ms = live_ts.as_millis() + self.config.search_window_ms;

        while candidate_ms <= window_end_ms {
            if let Some(candidate) = self.reference.nearest(Timestamp::from_millis(candidate_ms)) {
                let score = compare_frames(&self.scoring, &live_frame.pose, &candidate.pose, 0)
                    .overall;
                let offset = candidate.timestamp.delta_ms(live_ts);
                let better = best.map_or(true, |(best_score, best_offset)| {
                    score > best_score
                        || (score == best_score && offset.abs() < best_offset.abs())
                });
                if better {
                    best = Some((score, offset));
                }
            }
            candidate_ms += self.config.search_step_ms;
        }

        match best {
            Some((score, offset)) if score >= self.config.acceptance_floor => {
                self.accepted_offset_ms = Some(offset);
                tracing::debug!(offset_ms = offset, score, "offset search accepted");
                offset
            }
            _ => 0,
        }
    }

    /// Strategy B: banded DTW over the buffered frames, throttled to the
    /// configured recompute cadence. Returns whether a new path was
    /// computed. When the buffers are too unequal for the band to connect
    /// corner to corner the previous path (or offset) stays in effect.
    pub fn recompute_path(&mut self, now: Timestamp) -> bool {
        if self.live.len() < 2 || self.reference.len() < 2 {
            return false;
        }
        if let Some(path) = &self.path {
            if now.delta_ms(path.computed_at) < self.config.recompute_interval_ms {
                return false;
            }
        }

        let live: Vec<&BufferedFrame> = self.live.frames.iter().collect();
        let reference: Vec<&BufferedFrame> = self.reference.frames.iter().collect();
        let Some(steps) = banded_dtw_path(&live, &reference, self.config.band_width) else {
            tracing::debug!(
                live_frames = live.len(),
                reference_frames = reference.len(),
                "warp band disconnected, keeping previous alignment"
            );
            return false;
        };

        tracing::debug!(
            live_frames = live.len(),
            reference_frames = reference.len(),
            path_len = steps.len(),
            "warp path recomputed"
        );
        self.path = Some(WarpPath {
            steps,
            computed_at: now,
        });
        true
    }

    /// Which reference timestamp should be paired with `live_ts`.
    ///
    /// Fallback chain: warp path (nearest step, extrapolated by the local
    /// timeline delta) → last accepted offset → wall-clock identity.
    pub fn reference_timestamp_for(&self, live_ts: Timestamp) -> Timestamp {
        if let Some(path) = &self.path {
            if let Some(step) = path
                .steps
                .iter()
                .min_by_key(|s| s.live.delta_ms(live_ts).abs())
            {
                return step.reference.offset_ms(live_ts.delta_ms(step.live));
            }
        }

        match self.accepted_offset_ms {
            Some(offset) => live_ts.offset_ms(offset),
            None => live_ts,
        }
    }

    /// Clear buffers, offset, and path; call between sessions.
    pub fn reset(&mut self) {
        self.live.clear();
        self.reference.clear();
        self.accepted_offset_ms = None;
        self.path = None;
    }
}

impl Default for TemporalAligner {
    fn default() -> Self {
        Self::new(AlignerConfig::default(), ScoringConfig::default())
    }
}

/// Mean angular distance between two poses, the DTW cell cost.
fn pose_distance(a: &NormalizedPose, b: &NormalizedPose) -> f64 {
    let a_flat = a.angles.to_flat();
    let b_flat = b.angles.to_flat();
    let total: f64 = a_flat
        .iter()
        .zip(b_flat.iter())
        .map(|(&x, &y)| angular_difference(x, y))
        .sum();
    total / a_flat.len() as f64
}

/// Classic DTW recurrence restricted to a band of ±`band_width` cells
/// around the scaled diagonal, with back-pointers for path recovery.
/// Work is O(N·K) instead of O(N²). `None` when the band never connects
/// the origin to the final cell (buffers too unequal in length).
fn banded_dtw_path(
    live: &[&BufferedFrame],
    reference: &[&BufferedFrame],
    band_width: usize,
) -> Option<Vec<WarpStep>> {
    let n = live.len();
    let m = reference.len();

    const NO_MOVE: u8 = u8::MAX;
    const DIAGONAL: u8 = 0;
    const FROM_PREV_LIVE: u8 = 1;
    const FROM_PREV_REF: u8 = 2;

    let mut cost = vec![f64::INFINITY; n * m];
    let mut back = vec![NO_MOVE; n * m];
    let idx = |i: usize, j: usize| i * m + j;

    for i in 0..n {
        // Band centered on the scaled diagonal so unequal buffer lengths
        // still connect corner to corner
        let center = i * m / n;
        let j_start = center.saturating_sub(band_width);
        let j_end = (center + band_width).min(m - 1);

        for j in j_start..=j_end {
            let d = pose_distance(&live[i].pose, &reference[j].pose);

            let (prev_cost, step) = if i == 0 && j == 0 {
                (0.0, DIAGONAL)
            } else {
                let mut prev_cost = f64::INFINITY;
                let mut step = NO_MOVE;
                if i > 0 && j > 0 && cost[idx(i - 1, j - 1)] < prev_cost {
                    prev_cost = cost[idx(i - 1, j - 1)];
                    step = DIAGONAL;
                }
                if i > 0 && cost[idx(i - 1, j)] < prev_cost {
                    prev_cost = cost[idx(i - 1, j)];
                    step = FROM_PREV_LIVE;
                }
                if j > 0 && cost[idx(i, j - 1)] < prev_cost {
                    prev_cost = cost[idx(i, j - 1)];
                    step = FROM_PREV_REF;
                }
                (prev_cost, step)
            };

            if step != NO_MOVE || (i == 0 && j == 0) {
                cost[idx(i, j)] = d + prev_cost;
                back[idx(i, j)] = step;
            }
        }
    }

    if back[idx(n - 1, m - 1)] == NO_MOVE {
        return None;
    }

    // Walk back-pointers from the final cell to the origin; every cell on
    // the walk is reachable once the final cell is
    let mut steps = Vec::new();
    let (mut i, mut j) = (n - 1, m - 1);
    loop {
        steps.push(WarpStep {
            live: live[i].timestamp,
            reference: reference[j].timestamp,
        });
        if i == 0 && j == 0 {
            break;
        }
        match back[idx(i, j)] {
            DIAGONAL => {
                i -= 1;
                j -= 1;
            }
            FROM_PREV_LIVE => i -= 1,
            _ => j -= 1,
        }
    }
    steps.reverse();
    Some(steps)
}
