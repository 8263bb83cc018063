use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter tier a candidate cleared. Stage 2 is a refinement of stage 1,
/// not a disjoint partition: every stage 2 candidate is also a stage 1
/// candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Stage1,
    Stage2,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Stage1 => write!(f, "stage1"),
            Stage::Stage2 => write!(f, "stage2"),
        }
    }
}

/// One ticker that cleared the screening filter, with derived trade levels.
/// Recomputed every run; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub code: String,
    pub name: String,

    /// Last close in the window
    pub close: f64,

    /// Percentage rise of the close above the window low
    pub rally_pct: f64,

    /// Conservative limit-buy price: max(close * 0.97, today's open)
    pub target1: f64,

    /// Midpoint limit-buy price: (window low + close) / 2
    pub target2: f64,

    /// Trailing stop reference: mean close of the most recent 5 bars
    pub stop_loss: f64,

    /// Today's volume over the window average
    pub volume_ratio: f64,

    pub stage: Stage,
}

/// Why a ticker produced no classification this run. Per-ticker and
/// recoverable; never aborts the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Provider returned nothing, errored, or timed out
    Unavailable,

    /// Series shorter than the required window
    InsufficientHistory,

    /// Non-finite prices, unordered or duplicate dates
    MalformedData,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unavailable => write!(f, "data unavailable"),
            SkipReason::InsufficientHistory => write!(f, "insufficient history"),
            SkipReason::MalformedData => write!(f, "malformed data"),
        }
    }
}

/// Per-category skip counters, surfaced in the final report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub unavailable: usize,
    pub insufficient_history: usize,
    pub malformed_data: usize,
}

impl SkipCounts {
    pub fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Unavailable => self.unavailable += 1,
            SkipReason::InsufficientHistory => self.insufficient_history += 1,
            SkipReason::MalformedData => self.malformed_data += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.unavailable + self.insufficient_history + self.malformed_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_counts_record() {
        let mut counts = SkipCounts::default();
        counts.record(SkipReason::Unavailable);
        counts.record(SkipReason::Unavailable);
        counts.record(SkipReason::InsufficientHistory);
        counts.record(SkipReason::MalformedData);

        assert_eq!(counts.unavailable, 2);
        assert_eq!(counts.insufficient_history, 1);
        assert_eq!(counts.malformed_data, 1);
        assert_eq!(counts.total(), 4);
    }
}
