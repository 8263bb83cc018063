//! Screening Filter Constants
//!
//! The filter has churned through many revisions; every threshold lives here
//! so a tuning pass never has to touch the engine itself.
//!
//! ## Filter summary (two-tier gate)
//!
//! | Constant            | Value   | Meaning                                    |
//! |---------------------|---------|--------------------------------------------|
//! | `WINDOW_DAYS`       | 25      | Trading days in the analysis window        |
//! | `RANGE_FACTOR_S1`   | 1.15    | Stage 1: closes within +15% of window low  |
//! | `RANGE_FACTOR_S2`   | 1.10    | Stage 2: closes within +10% of window low  |
//! | `UP_FROM_LOW_RATE`  | 1.10    | Rebound: close at least +10% off the low   |
//! | `VOL_MULT_S1_TODAY` | 2.0     | Today's volume vs window average           |
//! | `VOL_MULT_S1_YEST`  | 1.5     | Yesterday's volume vs window average       |
//! | `VOL_MULT_S2`       | 2.0     | Stage 2: both days vs window average       |
//! | `PRICE_LIMIT_YEN`   | 200,000 | Cost ceiling for a 100-share lot           |

/// Trading days in the analysis window. A series needs `WINDOW_DAYS + 1`
/// bars to be evaluated at all.
pub const WINDOW_DAYS: usize = 25;

/// Stage 1 bottoming range: closes (excluding the most recent bars, see
/// `RANGE_EXCLUDE_RECENT_S1`) must stay within this multiple of the window low.
pub const RANGE_FACTOR_S1: f64 = 1.15;

/// Stage 2 bottoming range, tighter than stage 1.
pub const RANGE_FACTOR_S2: f64 = 1.10;

/// Rebound gate: today's close must be at least this multiple of the window low.
pub const UP_FROM_LOW_RATE: f64 = 1.10;

/// Stage 1 volume spike: today's volume vs the window average.
pub const VOL_MULT_S1_TODAY: f64 = 2.0;

/// Stage 1 volume spike: yesterday's volume vs the window average.
pub const VOL_MULT_S1_YEST: f64 = 1.5;

/// Stage 2 volume spike: both today and yesterday vs the window average.
pub const VOL_MULT_S2: f64 = 2.0;

/// Investment ceiling in yen for a 100-share lot (close * 100).
pub const PRICE_LIMIT_YEN: f64 = 200_000.0;

/// Bars dropped from the end of the window for the stage 1 range check.
/// The recent move itself must not disqualify the bottoming range.
pub const RANGE_EXCLUDE_RECENT_S1: usize = 3;

/// Bars dropped from the end of the window for the stage 2 range check.
pub const RANGE_EXCLUDE_RECENT_S2: usize = 1;

/// Bars dropped from the end of the window when computing the volume
/// average. Past revisions disagreed on whether "today" belongs in the
/// average; 0 (include today) is the canonical definition.
pub const VOLUME_AVG_EXCLUDE_RECENT: usize = 0;

/// Closing prices averaged for the trailing stop-loss reference.
pub const STOP_LOSS_DAYS: usize = 5;

/// Calendar days of history requested per fetch. 40 calendar days covers
/// at least 25 trading days even across holiday clusters.
pub const HISTORY_LOOKBACK_DAYS: u32 = 40;

/// Cache freshness window in seconds. Entries older than this trigger a refetch.
pub const CACHE_FRESH_SECS: i64 = 3600;

/// Delay before each network fetch (not before cache hits), in milliseconds.
pub const REQUEST_SLEEP_MS: u64 = 100;

/// HTTP timeout for the history provider, in seconds.
pub const PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Market suffix appended to JPX ticker codes for the history provider.
pub const MARKET_SUFFIX: &str = ".T";

/// Substrings a universe row's market-segment column must contain to be
/// scanned (TSE Prime, domestic stocks). Only applied when the universe CSV
/// carries a segment column.
pub const SEGMENT_FILTERS: &[&str] = &["プライム", "内国株式"];
