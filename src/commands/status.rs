use crate::services::PriceCache;
use crate::utils;
use chrono::Utc;
use std::path::PathBuf;

pub fn run(cache_path: Option<PathBuf>) {
    let path = cache_path.unwrap_or_else(utils::get_cache_path);

    println!("📊 Price Cache Status — {}\n", path.display());

    let cache = PriceCache::load(&path);
    if cache.is_empty() {
        println!("⚠️  Cache is empty. Run 'scan' to populate it.");
        return;
    }

    println!("{} tickers cached\n", cache.len());
    println!("{:<10} | {:<20} | {:>5} | {}", "code", "fetched at (UTC)", "bars", "last bar");
    println!("{}", "-".repeat(60));

    let mut entries: Vec<_> = cache.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let now = Utc::now();
    for (code, entry) in entries {
        let last_date = entry
            .series
            .last()
            .map(|b| b.date.to_string())
            .unwrap_or_else(|| "-".to_string());
        let freshness = if entry.is_fresh(now, crate::constants::CACHE_FRESH_SECS) {
            ""
        } else {
            " (stale)"
        };

        println!(
            "{:<10} | {:<20} | {:>5} | {}{}",
            code,
            entry.fetched_at.format("%Y-%m-%d %H:%M:%S"),
            entry.series.len(),
            last_date,
            freshness
        );
    }
}
