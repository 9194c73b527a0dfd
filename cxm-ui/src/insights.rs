//! Dashboard insights client
//!
//! Thin client for the external summary-text generator. The generator is an
//! opaque text producer: this module sends it a compact digest of the
//! normalized submission history and hands back whatever text it returns.
//! Every failure path (unconfigured endpoint, transport error, unexpected
//! response shape) degrades to a static fallback string so the dashboard
//! stays usable; nothing here ever propagates a hard error.

use cxm_common::models::Submission;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::warn;

/// Default timeout for generator requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Shown while the history is too small to analyze
const AWAITING_DATA: &str = "Awaiting more data for a strategic analysis.";

/// Shown whenever the generator cannot be reached or returns garbage
const FALLBACK: &str = "Automated insights are unavailable right now.";

/// Summary text generator client
///
/// Endpoint and key come from `CXM_INSIGHTS_URL` / `CXM_INSIGHTS_API_KEY`;
/// deployments without them get the fallback text immediately.
pub struct InsightsClient {
    http_client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl InsightsClient {
    /// Build a client from the process environment
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("CXM_INSIGHTS_URL").ok(),
            std::env::var("CXM_INSIGHTS_API_KEY").ok(),
        )
    }

    pub fn new(endpoint: Option<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            endpoint,
            api_key,
        }
    }

    /// Produce the dashboard insights text for a submission snapshot
    ///
    /// Infallible by contract: the worst outcome is the fallback string.
    pub async fn dashboard_insights(&self, submissions: &[Submission]) -> String {
        if submissions.is_empty() {
            return AWAITING_DATA.to_string();
        }

        let Some(endpoint) = &self.endpoint else {
            return FALLBACK.to_string();
        };

        match self.request_insights(endpoint, submissions).await {
            Some(text) => text,
            None => FALLBACK.to_string(),
        }
    }

    async fn request_insights(&self, endpoint: &str, submissions: &[Submission]) -> Option<String> {
        let digest = digest_lines(submissions);
        let prompt = format!(
            "Analyze this register checklist history and give the manager three \
             short, professional insights: {}",
            digest
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let mut request = self.http_client.post(endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("insights generator unreachable: {}", e);
                return None;
            }
        };
        if !response.status().is_success() {
            warn!("insights generator returned {}", response.status());
            return None;
        }

        let value: Value = match response.json().await {
            Ok(value) => value,
            Err(e) => {
                warn!("insights response was not JSON: {}", e);
                return None;
            }
        };
        extract_text(&value)
    }
}

/// Compact per-submission digest handed to the generator
fn digest_lines(submissions: &[Submission]) -> String {
    let lines: Vec<Value> = submissions
        .iter()
        .map(|s| {
            json!({
                "user": s.user_name,
                "date": s.submitted_at.date_naive().to_string(),
                "completion": format!(
                    "{}/{}",
                    s.completed_items.len(),
                    cxm_common::checklist::total_item_count()
                ),
                "isComplete": s.is_full_complete,
            })
        })
        .collect();
    Value::Array(lines).to_string()
}

/// Pull the generated text out of the response envelope
fn extract_text(value: &Value) -> Option<String> {
    let text = value
        .pointer("/candidates/0/content/parts/0/text")
        .or_else(|| value.get("text"))
        .and_then(Value::as_str)?;
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn submission() -> Submission {
        Submission {
            id: Uuid::from_u128(1),
            user_id: Uuid::from_u128(2),
            user_name: "Ana".to_string(),
            submitted_at: Utc::now(),
            completed_items: (1..=20).collect::<BTreeSet<u16>>(),
            is_full_complete: true,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_empty_snapshot_short_circuits() {
        let client = InsightsClient::new(None, None);
        assert_eq!(client.dashboard_insights(&[]).await, AWAITING_DATA);
    }

    #[tokio::test]
    async fn test_unconfigured_endpoint_degrades_to_fallback() {
        let client = InsightsClient::new(None, None);
        assert_eq!(client.dashboard_insights(&[submission()]).await, FALLBACK);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_degrades_to_fallback() {
        // Reserved TEST-NET address; connection fails fast.
        let client = InsightsClient::new(
            Some("http://192.0.2.1:1/generate".to_string()),
            Some("test-key".to_string()),
        );
        assert_eq!(client.dashboard_insights(&[submission()]).await, FALLBACK);
    }

    #[test]
    fn test_digest_carries_completion_ratio() {
        let digest = digest_lines(&[submission()]);
        assert!(digest.contains("\"completion\":\"20/20\""));
        assert!(digest.contains("\"user\":\"Ana\""));
    }

    #[test]
    fn test_extract_text_handles_generator_envelope() {
        let value = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "three insights" }] } }]
        });
        assert_eq!(extract_text(&value).unwrap(), "three insights");

        let flat = serde_json::json!({ "text": "flat shape" });
        assert_eq!(extract_text(&flat).unwrap(), "flat shape");

        assert!(extract_text(&serde_json::json!({})).is_none());
        assert!(extract_text(&serde_json::json!({ "text": "  " })).is_none());
    }
}
