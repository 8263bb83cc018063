pub mod cache;
pub mod llm;
pub mod mailer;
pub mod provider;
pub mod refresh;
pub mod report;
pub mod scan;
pub mod screener;
pub mod universe;
pub mod yahoo;

pub use cache::{CacheEntry, PriceCache};
pub use provider::HistoryProvider;
pub use refresh::RefreshCoordinator;
pub use report::ScanReport;
pub use scan::{run_scan, ScanOptions};
pub use screener::{classify, Verdict};
pub use universe::load_universe;
pub use yahoo::YahooChartClient;
