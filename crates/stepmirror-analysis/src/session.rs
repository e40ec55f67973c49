//! Session aggregation: running score history, summary statistics, and the
//! weak-interval report.
//!
//! State is an explicit sample list; `summarize` and `find_weak_intervals`
//! are pure functions over it, so every query is a transform of a value
//! rather than hidden mutation.

use serde::{Deserialize, Serialize};
use stepmirror_core::{Error, Result, SessionId, Timestamp};

use crate::config::SessionConfig;
use crate::scorer::{BodyPartScores, FrameScoreResult};

/// One recorded comparison tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSample {
    pub timestamp: Timestamp,
    pub overall: u8,
    pub body_parts: BodyPartScores,
}

/// Timeline entry handed to visualization layers verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timestamp: Timestamp,
    pub score: u8,
}

/// A merged span of the session where the overall score stayed weak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeakInterval {
    pub start: Timestamp,
    pub end: Timestamp,
    pub average_score: u8,
}

impl WeakInterval {
    pub fn duration_ms(&self) -> i64 {
        self.end.delta_ms(self.start)
    }
}

/// Letter grade for a session's overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    APlus,
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        match score {
            95.. => Grade::APlus,
            90..=94 => Grade::A,
            85..=89 => Grade::AMinus,
            80..=84 => Grade::BPlus,
            75..=79 => Grade::B,
            70..=74 => Grade::BMinus,
            65..=69 => Grade::CPlus,
            60..=64 => Grade::C,
            55..=59 => Grade::CMinus,
            50..=54 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

/// Complete session analysis, plain and serializable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    /// Mean overall score across all samples
    pub overall: u8,
    /// Mean per-body-part scores
    pub body_parts: BodyPartScores,
    pub timeline: Vec<TimelineEntry>,
    /// Worst sections first, capped per [`SessionConfig::max_reported_intervals`]
    pub weak_intervals: Vec<WeakInterval>,
    pub duration_ms: i64,
    pub grade: Grade,
}

impl SessionSummary {
    /// The explicit zero-valued summary for a session with no samples.
    pub fn empty(session_id: SessionId) -> Self {
        Self {
            session_id,
            overall: 0,
            body_parts: BodyPartScores::zeroed(),
            timeline: Vec::new(),
            weak_intervals: Vec::new(),
            duration_ms: 0,
            grade: Grade::F,
        }
    }
}

/// Single left-to-right pass over the sample list.
///
/// Closing policy: an interval is closed only by a sub-threshold sample
/// arriving more than the merge tolerance after the interval's end (or by
/// the end of the stream). A brief above-threshold recovery does not close
/// it, so a dip, one good frame, and another dip within tolerance merge
/// into one reported section.
pub fn find_weak_intervals(samples: &[ScoreSample], config: &SessionConfig) -> Vec<WeakInterval> {
    struct Open {
        start: Timestamp,
        end: Timestamp,
        total: u64,
        count: u64,
    }

    let mut intervals = Vec::new();
    let mut open: Option<Open> = None;

    let mut close = |open: &mut Option<Open>, intervals: &mut Vec<WeakInterval>| {
        if let Some(o) = open.take() {
            if o.end.delta_ms(o.start) >= config.min_interval_ms {
                intervals.push(WeakInterval {
                    start: o.start,
                    end: o.end,
                    average_score: ((o.total as f64) / (o.count as f64)).round() as u8,
                });
            }
        }
    };

    for sample in samples {
        if sample.overall >= config.weak_threshold {
            continue;
        }

        let extended = match &mut open {
            Some(o) if sample.timestamp.delta_ms(o.end) <= config.merge_tolerance_ms => {
                o.end = sample.timestamp;
                o.total += sample.overall as u64;
                o.count += 1;
                true
            }
            _ => false,
        };

        if !extended {
            close(&mut open, &mut intervals);
            open = Some(Open {
                start: sample.timestamp,
                end: sample.timestamp,
                total: sample.overall as u64,
                count: 1,
            });
        }
    }
    close(&mut open, &mut intervals);

    // Worst first, bounded for the UI
    intervals.sort_by_key(|iv| iv.average_score);
    intervals.truncate(config.max_reported_intervals);
    intervals
}

/// Pure reduction of a sample list into a session summary.
pub fn summarize(
    session_id: SessionId,
    samples: &[ScoreSample],
    config: &SessionConfig,
) -> SessionSummary {
    if samples.is_empty() {
        return SessionSummary::empty(session_id);
    }

    let n = samples.len() as f64;
    let mean = |f: fn(&ScoreSample) -> u8| {
        (samples.iter().map(|s| f(s) as u64).sum::<u64>() as f64 / n).round() as u8
    };

    let overall = mean(|s| s.overall);
    let duration_ms = samples
        .last()
        .map(|last| last.timestamp.delta_ms(samples[0].timestamp))
        .unwrap_or(0);

    SessionSummary {
        session_id,
        overall,
        body_parts: BodyPartScores {
            arms: mean(|s| s.body_parts.arms),
            legs: mean(|s| s.body_parts.legs),
            torso: mean(|s| s.body_parts.torso),
        },
        timeline: samples
            .iter()
            .map(|s| TimelineEntry {
                timestamp: s.timestamp,
                score: s.overall,
            })
            .collect(),
        weak_intervals: find_weak_intervals(samples, config),
        duration_ms,
        grade: Grade::from_score(overall),
    }
}

/// Append-only accumulator for one training session.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    session_id: SessionId,
    config: SessionConfig,
    samples: Vec<ScoreSample>,
}

impl SessionTracker {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            session_id: SessionId::new(),
            config,
            samples: Vec::new(),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Record one comparison tick. Timestamps must be non-decreasing;
    /// out-of-order samples are rejected rather than silently corrupting
    /// interval merging.
    pub fn add_score(&mut self, timestamp: Timestamp, result: &FrameScoreResult) -> Result<()> {
        if let Some(last) = self.samples.last() {
            if timestamp < last.timestamp {
                return Err(Error::OutOfOrderTimestamp {
                    previous_ms: last.timestamp.as_millis(),
                    received_ms: timestamp.as_millis(),
                });
            }
        }

        self.samples.push(ScoreSample {
            timestamp,
            overall: result.overall,
            body_parts: result.body_parts,
        });
        Ok(())
    }

    /// Recompute the full summary from the retained sample list.
    pub fn session_result(&self) -> SessionSummary {
        let summary = summarize(self.session_id, &self.samples, &self.config);
        tracing::debug!(
            samples = self.samples.len(),
            overall = summary.overall,
            weak_intervals = summary.weak_intervals.len(),
            "session summarized"
        );
        summary
    }

    /// Start over with a fresh session id.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.session_id = SessionId::new();
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
