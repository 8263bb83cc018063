use crate::error::Result;
use crate::models::PriceSeries;
use async_trait::async_trait;

/// Source of daily OHLCV history for one symbol.
///
/// Implementations must return bars ordered ascending by date. An empty
/// result and a transport error are both mapped to "unavailable" by the
/// refresh coordinator, so implementations are free to use either.
#[async_trait]
pub trait HistoryProvider {
    /// Fetch roughly `lookback_days` calendar days of daily bars for `code`.
    async fn fetch(&mut self, code: &str, lookback_days: u32) -> Result<PriceSeries>;
}
