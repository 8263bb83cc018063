use crate::models::Candidate;
use isahc::{config::Configurable, AsyncReadResponseExt, HttpClient, Request};
use serde_json::{json, Value};
use std::time::Duration as StdDuration;
use tracing::{info, warn};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const MAX_ATTEMPTS: usize = 3;
const OVERLOAD_BACKOFF_SECS: u64 = 15;

/// Optional narrative layer over the stage 1 list. The screening result is
/// complete and valid with or without it: every failure path degrades to a
/// placeholder paragraph instead of an error.
pub struct GeminiSummarizer {
    client: HttpClient,
    api_key: String,
    model: String,
}

impl GeminiSummarizer {
    /// Build from `GEMINI_API_KEY` (and optional `GEMINI_MODEL`); returns
    /// None when no key is configured.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok()?;
        if api_key.is_empty() {
            return None;
        }

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let client = match HttpClient::builder()
            .timeout(StdDuration::from_secs(60))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Failed to create LLM HTTP client, skipping AI analysis");
                return None;
            }
        };

        Some(Self {
            client,
            api_key,
            model,
        })
    }

    /// Narrate the stage 1 picks. Retries on overload, then gives up with
    /// a placeholder; never fails the run.
    pub async fn summarize(&self, candidates: &[Candidate]) -> String {
        if candidates.is_empty() {
            return "No tickers matched the screening filter today.".to_string();
        }

        let prompt = build_prompt(candidates);

        for attempt in 1..=MAX_ATTEMPTS {
            match self.generate(&prompt).await {
                Ok(text) => return text,
                Err(GenerateError::Overloaded) => {
                    warn!(
                        attempt,
                        max_attempts = MAX_ATTEMPTS,
                        "LLM service overloaded, backing off"
                    );
                    tokio::time::sleep(StdDuration::from_secs(OVERLOAD_BACKOFF_SECS)).await;
                }
                Err(GenerateError::Other(msg)) => {
                    warn!(error = %msg, "AI analysis failed");
                    return format!("AI analysis unavailable this run: {}", msg);
                }
            }
        }

        "AI analysis skipped: the service stayed overloaded.".to_string()
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let request = Request::post(url.as_str())
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .map_err(|e| GenerateError::Other(format!("request build failed: {}", e)))?;

        let mut response = self
            .client
            .send_async(request)
            .await
            .map_err(|e| GenerateError::Other(format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerateError::Other(format!("response read failed: {}", e)))?;

        if status.as_u16() == 503 || text.to_lowercase().contains("overloaded") {
            return Err(GenerateError::Overloaded);
        }

        if !status.is_success() {
            return Err(GenerateError::Other(format!("HTTP {}", status)));
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| GenerateError::Other(format!("bad response JSON: {}", e)))?;

        value["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| {
                info!(model = %self.model, "AI analysis generated");
                s.to_string()
            })
            .ok_or_else(|| GenerateError::Other("response had no text part".to_string()))
    }
}

enum GenerateError {
    Overloaded,
    Other(String),
}

/// Prompt over the stage 1 list: facts in, short structured analysis out
fn build_prompt(candidates: &[Candidate]) -> String {
    let mut listing = String::new();
    for c in candidates {
        listing.push_str(&format!(
            "### {} ({})\n- close: {:.1} yen (+{:.1}% off the 25-day low)\n- volume: {:.1}x the 25-day average\n- limit buys: {:.1} / {:.1}, stop below {:.1}\n",
            c.name, c.code, c.close, c.rally_pct, c.volume_ratio, c.target1, c.target2, c.stop_loss
        ));
    }

    format!(
        "The following Japanese stocks cleared a technical screen for early \
rebounds out of a bottoming range (price near the 25-day low, +10% rebound, \
volume spike). For each, write a brief factual analysis:\n\
1. Background: what the company does and the current market context\n\
2. Read: what the price/volume surge suggests about buying pressure\n\
3. Watch: what to look for over the next sessions\n\n\
Tickers:\n{}",
        listing
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stage;

    #[test]
    fn test_prompt_includes_every_candidate() {
        let candidates = vec![
            Candidate {
                code: "7203.T".to_string(),
                name: "Toyota Motor".to_string(),
                close: 124.0,
                rally_pct: 37.78,
                target1: 120.28,
                target2: 107.0,
                stop_loss: 103.8,
                volume_ratio: 3.0,
                stage: Stage::Stage1,
            },
            Candidate {
                code: "6758.T".to_string(),
                name: "Sony Group".to_string(),
                close: 95.0,
                rally_pct: 12.1,
                target1: 92.2,
                target2: 90.0,
                stop_loss: 88.0,
                volume_ratio: 2.4,
                stage: Stage::Stage2,
            },
        ];

        let prompt = build_prompt(&candidates);
        assert!(prompt.contains("7203.T"));
        assert!(prompt.contains("6758.T"));
        assert!(prompt.contains("+37.8% off the 25-day low"));
    }
}
