mod bar;
mod candidate;
mod filter;
mod ticker;

pub use bar::Bar;
pub use candidate::{Candidate, SkipCounts, SkipReason, Stage};
pub use filter::FilterConfig;
pub use ticker::Ticker;

/// Daily price history for a single ticker, ascending by date
pub type PriceSeries = Vec<Bar>;
