use crate::constants::PROVIDER_TIMEOUT_SECS;
use crate::error::{AppError, Result};
use crate::models::{Bar, PriceSeries};
use crate::services::provider::HistoryProvider;
use async_trait::async_trait;
use chrono::DateTime;
use isahc::{config::Configurable, AsyncReadResponseExt, HttpClient, Request};
use serde_json::Value;
use std::time::Duration as StdDuration;
use tracing::debug;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
];

/// Daily history client for the Yahoo Finance chart API.
///
/// Requests are bounded by a hard timeout; a timeout surfaces as a network
/// error and the coordinator treats it as "unavailable" for that ticker.
pub struct YahooChartClient {
    client: HttpClient,
    request_count: usize,
}

impl YahooChartClient {
    pub fn new() -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            request_count: 0,
        })
    }

    fn next_user_agent(&mut self) -> &'static str {
        let agent = USER_AGENTS[self.request_count % USER_AGENTS.len()];
        self.request_count += 1;
        agent
    }
}

#[async_trait]
impl HistoryProvider for YahooChartClient {
    async fn fetch(&mut self, code: &str, lookback_days: u32) -> Result<PriceSeries> {
        let url = format!(
            "{}/{}?range={}d&interval=1d&includePrePost=false",
            BASE_URL, code, lookback_days
        );
        let agent = self.next_user_agent();

        let request = Request::get(url.as_str())
            .header("User-Agent", agent)
            .header("Accept", "application/json")
            .body(())
            .map_err(|e| AppError::Network(format!("Failed to build request: {}", e)))?;

        let mut response = self
            .client
            .send_async(request)
            .await
            .map_err(|e| AppError::Network(format!("Chart request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Chart request for {} returned HTTP {}",
                code,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read response body: {}", e)))?;

        let series = parse_chart_body(code, &body)?;
        debug!(ticker = code, bars = series.len(), "Fetched daily history");
        Ok(series)
    }
}

/// Parse a Yahoo chart API response body into daily bars, ascending by
/// date. Days where any quote field is null (halts, partial rows) are
/// dropped rather than guessed at.
pub fn parse_chart_body(code: &str, body: &str) -> Result<PriceSeries> {
    let value: Value = serde_json::from_str(body)?;
    let chart = &value["chart"];

    if !chart["error"].is_null() {
        return Err(AppError::NotFound(format!(
            "Chart API error for {}: {}",
            code, chart["error"]
        )));
    }

    let result = chart["result"]
        .get(0)
        .ok_or_else(|| AppError::NotFound(format!("No chart result for {}", code)))?;

    let timestamps = match result["timestamp"].as_array() {
        Some(ts) => ts,
        None => return Ok(Vec::new()), // Listed but no bars in range
    };

    let quote = &result["indicators"]["quote"][0];
    let opens = quote["open"]
        .as_array()
        .ok_or_else(|| AppError::Parse(format!("Missing open column for {}", code)))?;
    let highs = quote["high"]
        .as_array()
        .ok_or_else(|| AppError::Parse(format!("Missing high column for {}", code)))?;
    let lows = quote["low"]
        .as_array()
        .ok_or_else(|| AppError::Parse(format!("Missing low column for {}", code)))?;
    let closes = quote["close"]
        .as_array()
        .ok_or_else(|| AppError::Parse(format!("Missing close column for {}", code)))?;
    let volumes = quote["volume"]
        .as_array()
        .ok_or_else(|| AppError::Parse(format!("Missing volume column for {}", code)))?;

    let mut series: PriceSeries = Vec::with_capacity(timestamps.len());

    for (i, ts) in timestamps.iter().enumerate() {
        let ts = match ts.as_i64() {
            Some(ts) => ts,
            None => continue,
        };

        let (open, high, low, close) = match (
            opens.get(i).and_then(Value::as_f64),
            highs.get(i).and_then(Value::as_f64),
            lows.get(i).and_then(Value::as_f64),
            closes.get(i).and_then(Value::as_f64),
        ) {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => continue,
        };

        let volume = volumes.get(i).and_then(Value::as_u64).unwrap_or(0);

        let date = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| AppError::Parse(format!("Invalid timestamp {} for {}", ts, code)))?
            .date_naive();

        // Intraday sessions can repeat the day's date; keep the last row
        if series.last().map(|b: &Bar| b.date) == Some(date) {
            series.pop();
        }

        series.push(Bar::new(date, open, high, low, close, volume));
    }

    series.sort_by_key(|b| b.date);
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_body(error: &str, timestamps: &str, quote: &str) -> String {
        format!(
            r#"{{"chart":{{"result":[{{"meta":{{"symbol":"7203.T"}},"timestamp":{},"indicators":{{"quote":[{}]}}}}],"error":{}}}}}"#,
            timestamps, quote, error
        )
    }

    #[test]
    fn test_parse_chart_body() {
        // 2026-08-20 and 2026-08-21 session opens (JST morning)
        let body = chart_body(
            "null",
            "[1786924800, 1787011200]",
            r#"{"open":[100.0,104.0],"high":[105.0,110.0],"low":[99.0,103.0],"close":[104.0,109.5],"volume":[12000,15000]}"#,
        );

        let series = parse_chart_body("7203.T", &body).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series[0].date < series[1].date);
        assert_eq!(series[1].close, 109.5);
        assert_eq!(series[1].volume, 15000);
    }

    #[test]
    fn test_parse_skips_null_rows() {
        let body = chart_body(
            "null",
            "[1786924800, 1787011200, 1787097600]",
            r#"{"open":[100.0,null,104.0],"high":[105.0,null,110.0],"low":[99.0,null,103.0],"close":[104.0,null,109.5],"volume":[12000,null,15000]}"#,
        );

        let series = parse_chart_body("7203.T", &body).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_parse_chart_error_is_err() {
        let body = chart_body(
            r#"{"code":"Not Found","description":"No data found"}"#,
            "[]",
            r#"{"open":[],"high":[],"low":[],"close":[],"volume":[]}"#,
        );

        assert!(parse_chart_body("0000.T", &body).is_err());
    }

    #[test]
    fn test_parse_no_timestamps_is_empty() {
        let body = r#"{"chart":{"result":[{"meta":{"symbol":"7203.T"},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let series = parse_chart_body("7203.T", body).unwrap();
        assert!(series.is_empty());
    }
}
