//! The two-stage screening predicate: bottoming range + rebound + volume
//! spike, with a stricter second tier on the same signals.
//!
//! `classify` is a pure function of the series and the filter config. All
//! threshold comparisons use raw floating-point values with inclusive
//! boundaries; rounding happens only at display time.

use crate::models::{Bar, Candidate, FilterConfig, SkipReason, Stage};

/// Outcome of screening one ticker: either a candidate or an explicit
/// non-match. Skips (bad or missing data) are the error channel.
#[derive(Debug, Clone)]
pub enum Verdict {
    Match(Candidate),
    NoMatch,
}

impl Verdict {
    pub fn as_match(&self) -> Option<&Candidate> {
        match self {
            Verdict::Match(c) => Some(c),
            Verdict::NoMatch => None,
        }
    }
}

/// Apply the two-stage filter to one ticker's daily history.
///
/// Requires at least `window_days + 1` bars; the series must be ascending
/// by date with no duplicates and finite positive prices, otherwise the
/// ticker is rejected as malformed rather than propagating a panic past
/// the per-ticker boundary.
pub fn classify(
    code: &str,
    name: &str,
    series: &[Bar],
    config: &FilterConfig,
) -> Result<Verdict, SkipReason> {
    if series.len() < config.window_days + 1 {
        return Err(SkipReason::InsufficientHistory);
    }

    if !series_is_well_formed(series) {
        return Err(SkipReason::MalformedData);
    }

    let window = &series[series.len() - config.window_days..];
    let n = window.len();

    let low_window = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let today = &window[n - 1];
    let close_today = today.close;
    let vol_today = today.volume as f64;
    let vol_yesterday = window[n - 2].volume as f64;

    let vol_avg = mean_volume(&window[..n - config.volume_avg_exclude_recent.min(n - 1)]);

    // Stage 1 gates
    let range_s1 = max_close(&window[..n.saturating_sub(config.range_exclude_recent_s1)])
        <= low_window * config.range_factor_s1;
    let rebound = close_today >= low_window * config.up_from_low_rate;
    let volume_s1 = vol_today >= vol_avg * config.vol_mult_s1_today
        && vol_yesterday >= vol_avg * config.vol_mult_s1_yest;
    let affordable = close_today * 100.0 <= config.price_limit_yen;

    if !(range_s1 && rebound && volume_s1 && affordable) {
        return Ok(Verdict::NoMatch);
    }

    // Stage 2 is a strictly tighter gate on the same inputs
    let range_s2 = max_close(&window[..n.saturating_sub(config.range_exclude_recent_s2)])
        <= low_window * config.range_factor_s2;
    let volume_s2 = vol_today >= vol_avg * config.vol_mult_s2
        && vol_yesterday >= vol_avg * config.vol_mult_s2;

    let stage = if range_s2 && volume_s2 {
        Stage::Stage2
    } else {
        Stage::Stage1
    };

    // Stop-loss averages the tail of the full series, not just the window
    let stop_tail = &series[series.len() - config.stop_loss_days.min(series.len())..];
    let stop_loss = stop_tail.iter().map(|b| b.close).sum::<f64>() / stop_tail.len() as f64;

    let volume_ratio = if vol_avg == 0.0 {
        0.0
    } else {
        vol_today / vol_avg
    };

    Ok(Verdict::Match(Candidate {
        code: code.to_string(),
        name: name.to_string(),
        close: close_today,
        rally_pct: (close_today / low_window - 1.0) * 100.0,
        target1: (close_today * 0.97).max(today.open),
        target2: (low_window + close_today) / 2.0,
        stop_loss,
        volume_ratio,
        stage,
    }))
}

/// Finite positive prices, strictly ascending dates, no duplicates
fn series_is_well_formed(series: &[Bar]) -> bool {
    series.iter().all(Bar::is_well_formed)
        && series.windows(2).all(|pair| pair[0].date < pair[1].date)
}

fn max_close(bars: &[Bar]) -> f64 {
    bars.iter().map(|b| b.close).fold(f64::NEG_INFINITY, f64::max)
}

fn mean_volume(bars: &[Bar]) -> f64 {
    if bars.is_empty() {
        return 0.0;
    }
    bars.iter().map(|b| b.volume as f64).sum::<f64>() / bars.len() as f64
}
