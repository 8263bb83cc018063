use crate::constants;

/// Numeric thresholds for the two-stage screening filter.
///
/// Loaded once per run and never mutated; defaults come from
/// [`crate::constants`]. The window-exclusion widths are configuration
/// rather than hard-coded slices because the exact definitions have
/// churned across filter revisions.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Trading days in the analysis window
    pub window_days: usize,

    /// Stage 1 bottoming range multiple of the window low
    pub range_factor_s1: f64,

    /// Stage 2 bottoming range multiple of the window low
    pub range_factor_s2: f64,

    /// Rebound gate: minimum close as a multiple of the window low
    pub up_from_low_rate: f64,

    /// Stage 1: today's volume vs window average
    pub vol_mult_s1_today: f64,

    /// Stage 1: yesterday's volume vs window average
    pub vol_mult_s1_yest: f64,

    /// Stage 2: both days' volume vs window average
    pub vol_mult_s2: f64,

    /// Cost ceiling in yen for a 100-share lot
    pub price_limit_yen: f64,

    /// Bars dropped from the end of the window for the stage 1 range check
    pub range_exclude_recent_s1: usize,

    /// Bars dropped from the end of the window for the stage 2 range check
    pub range_exclude_recent_s2: usize,

    /// Bars dropped from the end of the window for the volume average
    /// (0 means the average includes today)
    pub volume_avg_exclude_recent: usize,

    /// Closing prices averaged for the stop-loss reference
    pub stop_loss_days: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window_days: constants::WINDOW_DAYS,
            range_factor_s1: constants::RANGE_FACTOR_S1,
            range_factor_s2: constants::RANGE_FACTOR_S2,
            up_from_low_rate: constants::UP_FROM_LOW_RATE,
            vol_mult_s1_today: constants::VOL_MULT_S1_TODAY,
            vol_mult_s1_yest: constants::VOL_MULT_S1_YEST,
            vol_mult_s2: constants::VOL_MULT_S2,
            price_limit_yen: constants::PRICE_LIMIT_YEN,
            range_exclude_recent_s1: constants::RANGE_EXCLUDE_RECENT_S1,
            range_exclude_recent_s2: constants::RANGE_EXCLUDE_RECENT_S2,
            volume_avg_exclude_recent: constants::VOLUME_AVG_EXCLUDE_RECENT,
            stop_loss_days: constants::STOP_LOSS_DAYS,
        }
    }
}
