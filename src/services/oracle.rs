use crate::core::prompt::{build_request, parse_tool_call};
use crate::core::scorer::{retain_known_candidates, MatchScorer, ScoringError};
use crate::models::{Item, ScoredCandidate};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Chat-completions client that scores candidates through a language model
///
/// One POST per run. The model is forced to answer through the
/// `report_matches` tool; anything else counts as "no matches".
pub struct OracleScorer {
    endpoint: String,
    api_key: String,
    model: String,
    client: Client,
}

impl OracleScorer {
    pub fn new(endpoint: String, api_key: String, model: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key,
            model,
            client,
        })
    }
}

#[async_trait]
impl MatchScorer for OracleScorer {
    async fn score(&self, source: &Item, candidates: &[Item]) -> Result<Vec<ScoredCandidate>, ScoringError> {
        let body = build_request(&self.model, source, candidates);

        tracing::debug!(
            "Scoring item {} against {} candidates with {}",
            source.id,
            candidates.len(),
            self.model
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoringError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Oracle API error: {} - {}", status, error_text);

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ScoringError::RateLimited);
            }
            return Err(ScoringError::Unavailable(format!("AI API error: {}", status.as_u16())));
        }

        // Unreadable 2xx bodies count as zero matches
        let json: Value = match response.json().await {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Oracle returned an unreadable body: {}", e);
                return Ok(Vec::new());
            }
        };

        let reported = parse_tool_call(&json);
        let reported_count = reported.len();
        let matches = retain_known_candidates(reported, candidates);

        tracing::info!(
            "Oracle reported {} matches for item {} ({} kept)",
            reported_count,
            source.id,
            matches.len()
        );

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemCategory, ItemStatus};
    use chrono::{NaiveDate, Utc};
    use serde_json::json;
    use uuid::Uuid;

    fn item(title: &str, category: ItemCategory) -> Item {
        Item {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            description: title.to_string(),
            category,
            location: "Main St".to_string(),
            item_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            status: ItemStatus::Active,
            image_urls: vec![],
            created_at: Utc::now(),
        }
    }

    fn tool_response(matches: Value) -> String {
        json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "type": "function",
                        "function": {
                            "name": "report_matches",
                            "arguments": json!({ "matches": matches }).to_string()
                        }
                    }]
                }
            }]
        })
        .to_string()
    }

    fn scorer(server: &mockito::Server) -> OracleScorer {
        OracleScorer::new(
            format!("{}/v1/chat/completions", server.url()),
            "test-key".to_string(),
            "test-model".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_scores_parsed_and_filtered() {
        let source = item("black wallet", ItemCategory::Lost);
        let candidate = item("black leather wallet", ItemCategory::Found);

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJson(json!({
                "model": "test-model",
                "tool_choice": { "type": "function", "function": { "name": "report_matches" } }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(tool_response(json!([
                { "item_id": candidate.id.to_string(), "score": 0.9, "reason": "matching description and location" },
                { "item_id": Uuid::new_v4().to_string(), "score": 0.95, "reason": "hallucinated" }
            ])))
            .create_async()
            .await;

        let scored = scorer(&server).score(&source, &[candidate.clone()]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].item_id, candidate.id.to_string());
        assert_eq!(scored[0].score, 0.9);
        assert_eq!(scored[0].reason, "matching description and location");
    }

    #[tokio::test]
    async fn test_rate_limit_distinguished() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let source = item("phone", ItemCategory::Found);
        let err = scorer(&server)
            .score(&source, &[item("phone", ItemCategory::Lost)])
            .await
            .unwrap_err();

        assert!(matches!(err, ScoringError::RateLimited));
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(502)
            .create_async()
            .await;

        let source = item("phone", ItemCategory::Found);
        let err = scorer(&server)
            .score(&source, &[item("phone", ItemCategory::Lost)])
            .await
            .unwrap_err();

        match err {
            ScoringError::Unavailable(message) => assert!(message.contains("502")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_tool_call_is_zero_matches() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"I found nothing"}}]}"#)
            .create_async()
            .await;

        let source = item("phone", ItemCategory::Found);
        let scored = scorer(&server)
            .score(&source, &[item("phone", ItemCategory::Lost)])
            .await
            .unwrap();

        assert!(scored.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_oracle_is_unavailable() {
        let scorer = OracleScorer::new(
            "http://127.0.0.1:9/v1/chat/completions".to_string(),
            "k".to_string(),
            "m".to_string(),
            Duration::from_secs(2),
        )
        .unwrap();

        let source = item("phone", ItemCategory::Found);
        let err = scorer
            .score(&source, &[item("phone", ItemCategory::Lost)])
            .await
            .unwrap_err();

        assert!(matches!(err, ScoringError::Unavailable(_)));
    }
}
