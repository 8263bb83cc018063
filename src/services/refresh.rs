use crate::models::{PriceSeries, SkipReason};
use crate::services::cache::PriceCache;
use crate::services::provider::HistoryProvider;
use chrono::Utc;
use std::time::Duration as StdDuration;
use tracing::debug;

/// Per-ticker cache-or-fetch decision.
///
/// Owns the in-memory cache for the duration of the run (single writer);
/// persisting it is the caller's explicit step after the scan loop.
pub struct RefreshCoordinator<P: HistoryProvider> {
    provider: P,
    cache: PriceCache,
    freshness_secs: i64,
    lookback_days: u32,
    request_delay: StdDuration,
}

impl<P: HistoryProvider> RefreshCoordinator<P> {
    pub fn new(
        provider: P,
        cache: PriceCache,
        freshness_secs: i64,
        lookback_days: u32,
        request_delay: StdDuration,
    ) -> Self {
        Self {
            provider,
            cache,
            freshness_secs,
            lookback_days,
            request_delay,
        }
    }

    /// Yield a usable series for one ticker: a fresh cache hit, or a new
    /// fetch that overwrites the cache entry. Provider failure and empty
    /// results are recoverable per-ticker skips.
    pub async fn series_for(&mut self, code: &str) -> Result<PriceSeries, SkipReason> {
        if let Some(entry) = self.cache.get(code) {
            if entry.is_fresh(Utc::now(), self.freshness_secs) {
                debug!(ticker = code, "Cache hit");
                return Ok(entry.series.clone());
            }
            debug!(ticker = code, "Cache entry stale, refetching");
        }

        // Politeness delay applies only to network fetches, not cache hits
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        match self.provider.fetch(code, self.lookback_days).await {
            Ok(series) if !series.is_empty() => {
                self.cache.put(code, series.clone(), Utc::now());
                Ok(series)
            }
            Ok(_) => {
                debug!(ticker = code, "Provider returned no bars");
                Err(SkipReason::Unavailable)
            }
            Err(e) => {
                debug!(ticker = code, error = %e, "History fetch failed");
                Err(SkipReason::Unavailable)
            }
        }
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::Bar;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};

    struct StubProvider {
        response: Result<PriceSeries>,
        calls: usize,
    }

    #[async_trait]
    impl HistoryProvider for StubProvider {
        async fn fetch(&mut self, _code: &str, _lookback_days: u32) -> Result<PriceSeries> {
            self.calls += 1;
            match &self.response {
                Ok(series) => Ok(series.clone()),
                Err(e) => Err(AppError::Network(e.to_string())),
            }
        }
    }

    fn series() -> PriceSeries {
        vec![Bar::new(
            NaiveDate::from_ymd_opt(2026, 8, 21).unwrap(),
            100.0,
            105.0,
            99.0,
            104.0,
            12_000,
        )]
    }

    fn coordinator(
        cache: PriceCache,
        response: Result<PriceSeries>,
    ) -> RefreshCoordinator<StubProvider> {
        RefreshCoordinator::new(
            StubProvider { response, calls: 0 },
            cache,
            3600,
            40,
            StdDuration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_fresh_entry_skips_fetch() {
        let mut cache = PriceCache::default();
        cache.put("7203.T", series(), Utc::now());

        let mut coord = coordinator(cache, Ok(Vec::new()));
        let result = coord.series_for("7203.T").await.unwrap();

        assert_eq!(result, series());
        assert_eq!(coord.provider.calls, 0);
    }

    #[tokio::test]
    async fn test_stale_entry_triggers_refetch() {
        let mut cache = PriceCache::default();
        let mut old_series = series();
        old_series[0].close = 50.0;
        cache.put("7203.T", old_series, Utc::now() - Duration::hours(2));

        let mut coord = coordinator(cache, Ok(series()));
        let result = coord.series_for("7203.T").await.unwrap();

        assert_eq!(result, series());
        assert_eq!(coord.provider.calls, 1);
        // The stale entry was overwritten, not merged
        let entry = coord.cache().get("7203.T").unwrap();
        assert_eq!(entry.series, series());
        assert!(entry.is_fresh(Utc::now(), 3600));
    }

    #[tokio::test]
    async fn test_missing_entry_fetches_and_caches() {
        let mut coord = coordinator(PriceCache::default(), Ok(series()));
        let result = coord.series_for("7203.T").await.unwrap();

        assert_eq!(result, series());
        assert_eq!(coord.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_result_is_unavailable() {
        let mut coord = coordinator(PriceCache::default(), Ok(Vec::new()));
        let result = coord.series_for("7203.T").await;

        assert_eq!(result.unwrap_err(), SkipReason::Unavailable);
        assert!(coord.cache().is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_is_unavailable() {
        let mut coord = coordinator(
            PriceCache::default(),
            Err(AppError::Network("connection refused".into())),
        );
        let result = coord.series_for("7203.T").await;

        assert_eq!(result.unwrap_err(), SkipReason::Unavailable);
        assert!(coord.cache().is_empty());
    }
}
