use std::path::PathBuf;

/// Get cache file path from environment variable or use default
pub fn get_cache_path() -> PathBuf {
    std::env::var("KABUSCAN_CACHE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("stock_cache.json"))
}

/// Get universe CSV path from environment variable or use default
pub fn get_universe_path() -> PathBuf {
    std::env::var("KABUSCAN_UNIVERSE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data_jpx.csv"))
}

/// Get report output directory from environment variable or use default
pub fn get_report_dir() -> PathBuf {
    std::env::var("KABUSCAN_REPORT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
