use crate::constants::{MARKET_SUFFIX, SEGMENT_FILTERS};
use crate::error::{AppError, Result};
use crate::models::Ticker;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Recognized header spellings in the listing CSV. The JPX download uses
/// Japanese headers; hand-maintained lists tend to use English ones.
const CODE_HEADERS: &[&str] = &["コード", "code"];
const NAME_HEADERS: &[&str] = &["銘柄名", "name"];
const SEGMENT_HEADERS: &[&str] = &["市場・商品区分", "segment"];

/// Load the ticker universe from a listing CSV, preserving row order.
///
/// When the CSV carries a market-segment column, rows are kept only if the
/// segment contains every filter substring (TSE Prime domestic stocks by
/// default). A missing or unreadable file is fatal for the run: no tickers
/// means no meaningful work.
pub fn load_universe(path: &Path) -> Result<Vec<Ticker>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| AppError::Io(format!("Failed to open universe CSV {}: {}", path.display(), e)))?;

    let headers = reader
        .headers()
        .map_err(|e| AppError::Parse(format!("Failed to read universe headers: {}", e)))?
        .clone();

    let code_idx = find_column(&headers, CODE_HEADERS)
        .ok_or_else(|| AppError::Parse("Universe CSV has no ticker-code column".to_string()))?;
    let name_idx = find_column(&headers, NAME_HEADERS)
        .ok_or_else(|| AppError::Parse("Universe CSV has no name column".to_string()))?;
    let segment_idx = find_column(&headers, SEGMENT_HEADERS);

    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for record in reader.records() {
        let record =
            record.map_err(|e| AppError::Parse(format!("Failed to parse universe row: {}", e)))?;

        if let Some(idx) = segment_idx {
            let segment = record.get(idx).unwrap_or("");
            if !SEGMENT_FILTERS.iter().all(|f| segment.contains(f)) {
                continue;
            }
        }

        let code = record.get(code_idx).unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }

        let code = format!("{}{}", code, MARKET_SUFFIX);
        if !seen.insert(code.clone()) {
            continue;
        }

        let name = record.get(name_idx).unwrap_or("").trim().to_string();
        tickers.push(Ticker::new(code, name));
    }

    if tickers.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Universe CSV {} produced no tickers after filtering",
            path.display()
        )));
    }

    info!(path = %path.display(), tickers = tickers.len(), "Loaded ticker universe");
    Ok(tickers)
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| candidates.iter().any(|c| h.trim().eq_ignore_ascii_case(c)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("universe.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_jpx_headers_with_segment_filter() {
        let (_dir, path) = write_csv(
            "コード,銘柄名,市場・商品区分\n\
             7203,トヨタ自動車,プライム（内国株式）\n\
             1234,ある新興,グロース（内国株式）\n\
             6758,ソニーグループ,プライム（内国株式）\n",
        );

        let tickers = load_universe(&path).unwrap();
        assert_eq!(tickers.len(), 2);
        assert_eq!(tickers[0].code, "7203.T");
        assert_eq!(tickers[0].name, "トヨタ自動車");
        assert_eq!(tickers[1].code, "6758.T");
    }

    #[test]
    fn test_load_english_headers_without_segment() {
        let (_dir, path) = write_csv(
            "code,name\n\
             7203,Toyota Motor\n\
             7203,Toyota Motor (duplicate)\n\
             6758,Sony Group\n",
        );

        let tickers = load_universe(&path).unwrap();
        // Order preserved, duplicate dropped
        assert_eq!(tickers.len(), 2);
        assert_eq!(tickers[0].code, "7203.T");
        assert_eq!(tickers[0].name, "Toyota Motor");
        assert_eq!(tickers[1].code, "6758.T");
    }

    #[test]
    fn test_missing_code_column_is_fatal() {
        let (_dir, path) = write_csv("name,segment\nToyota,Prime\n");
        assert!(load_universe(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_universe(&dir.path().join("no_such.csv")).is_err());
    }

    #[test]
    fn test_all_rows_filtered_out_is_fatal() {
        let (_dir, path) = write_csv(
            "コード,銘柄名,市場・商品区分\n\
             1234,ある新興,グロース（内国株式）\n",
        );
        assert!(load_universe(&path).is_err());
    }
}
