use crate::constants::{CACHE_FRESH_SECS, HISTORY_LOOKBACK_DAYS, REQUEST_SLEEP_MS};
use crate::error::Result;
use crate::models::{FilterConfig, Ticker};
use crate::services::cache::PriceCache;
use crate::services::refresh::RefreshCoordinator;
use crate::services::report::ScanReport;
use crate::services::screener::{classify, Verdict};
use crate::services::yahoo::YahooChartClient;
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration as StdDuration;
use tracing::{info, warn};

/// Settings for one scan run, resolved by the CLI layer
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub universe_path: PathBuf,
    pub cache_path: PathBuf,
    pub limit: Option<usize>,
    pub sleep_ms: u64,
    pub fresh_secs: i64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            universe_path: crate::utils::get_universe_path(),
            cache_path: crate::utils::get_cache_path(),
            limit: None,
            sleep_ms: REQUEST_SLEEP_MS,
            fresh_secs: CACHE_FRESH_SECS,
        }
    }
}

/// Run the full scan: universe -> refresh -> classify -> aggregate.
///
/// One logical worker walks the tickers in universe order; per-ticker
/// failures become skip counts. The cache is saved once, after the loop
/// and before any externally-fallible step (LLM call, mail), so a crash
/// there cannot lose freshly-fetched data.
pub async fn run_scan(options: &ScanOptions, tickers: &[Ticker]) -> Result<ScanReport> {
    let tickers = match options.limit {
        Some(limit) => &tickers[..limit.min(tickers.len())],
        None => tickers,
    };

    let cache = PriceCache::load(&options.cache_path);
    let provider = YahooChartClient::new()?;
    let mut coordinator = RefreshCoordinator::new(
        provider,
        cache,
        options.fresh_secs,
        HISTORY_LOOKBACK_DAYS,
        StdDuration::from_millis(options.sleep_ms),
    );

    let config = FilterConfig::default();
    let mut report = ScanReport::new(Local::now(), tickers.len());

    info!(tickers = tickers.len(), "Starting scan");

    let pb = ProgressBar::new(tickers.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    for ticker in tickers {
        pb.inc(1);

        let series = match coordinator.series_for(&ticker.code).await {
            Ok(series) => series,
            Err(reason) => {
                report.skips.record(reason);
                continue;
            }
        };

        match classify(&ticker.code, &ticker.name, &series, &config) {
            Ok(Verdict::Match(candidate)) => {
                info!(
                    ticker = %ticker.code,
                    stage = %candidate.stage,
                    close = candidate.close,
                    rally_pct = candidate.rally_pct,
                    "Candidate found"
                );
                report.add(candidate);
            }
            Ok(Verdict::NoMatch) => {}
            Err(reason) => {
                report.skips.record(reason);
            }
        }
    }

    pb.finish_and_clear();

    // Autosave before anything externally fallible runs
    if let Err(e) = coordinator.cache().save(&options.cache_path) {
        warn!(error = %e, "Cache save failed, continuing with in-memory data");
    }

    info!(
        scanned = report.scanned,
        stage1 = report.stage1.len(),
        stage2 = report.stage2().count(),
        skipped = report.skips.total(),
        "Scan finished"
    );

    Ok(report)
}
