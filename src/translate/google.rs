use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{TranslationProvider, BATCH_SEPARATOR};
use crate::config::TranslateConfig;
use crate::error::{CorpusError, Result};
use crate::language::LanguageCode;

/// Provider for the keyless Google Translate web endpoint.
///
/// A batch is sent as one newline-joined blob and the answer is split back
/// into lines. Results are matched to inputs by line index, so a response
/// that merges or reorders lines comes back with the wrong count or order.
pub struct GoogleTranslateProvider {
    client: Client,
    endpoint: String,
    source_language: String,
}

impl GoogleTranslateProvider {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("langcorpus/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            source_language: config.source_language.clone(),
        })
    }

    fn provider_error(target: &LanguageCode, message: impl Into<String>) -> CorpusError {
        CorpusError::TranslationProvider {
            language: target.to_string(),
            message: message.into(),
        }
    }
}

/// Concatenate the translated segments of a `translate_a/single` response
fn extract_translation(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let mut text = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(Value::as_str) {
            text.push_str(part);
        }
    }
    Some(text)
}

fn split_lines(text: &str) -> Vec<String> {
    text.trim_end_matches(['\r', '\n'])
        .split(BATCH_SEPARATOR)
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

#[async_trait]
impl TranslationProvider for GoogleTranslateProvider {
    async fn translate(&self, target: &LanguageCode, texts: &[String]) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = texts.join(BATCH_SEPARATOR);
        debug!(
            "Sending {} lines ({} chars) to {} for '{}'",
            texts.len(),
            payload.chars().count(),
            self.endpoint,
            target
        );

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_language.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
            ])
            .form(&[("q", payload.as_str())])
            .send()
            .await
            .map_err(|e| Self::provider_error(target, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::provider_error(
                target,
                format!("API error {}: {}", status, error_text),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Self::provider_error(target, format!("Failed to parse response: {}", e)))?;

        let translated = extract_translation(&body)
            .ok_or_else(|| Self::provider_error(target, "Unexpected response shape"))?;

        Ok(split_lines(&translated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_translation_joins_segments() {
        let body = json!([
            [
                ["Bonjour le monde\n", "Hello world\n", null, null, 10],
                ["Bonjour", "Good morning", null, null, 10]
            ],
            null,
            "en"
        ]);
        let text = extract_translation(&body).unwrap();
        assert_eq!(split_lines(&text), vec!["Bonjour le monde", "Bonjour"]);
    }

    #[test]
    fn test_extract_translation_rejects_unknown_shape() {
        assert!(extract_translation(&json!({"error": "blocked"})).is_none());
    }

    #[test]
    fn test_split_lines_handles_crlf_and_trailing_newline() {
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a", "b"]);
        assert_eq!(split_lines("single"), vec!["single"]);
    }

    #[test]
    fn test_new_uses_config() {
        let config = TranslateConfig::default();
        let provider = GoogleTranslateProvider::new(&config).unwrap();
        assert_eq!(provider.endpoint, config.endpoint);
        assert_eq!(provider.source_language, "en");
    }

    #[test]
    fn test_empty_batch_issues_no_request() {
        let mut config = TranslateConfig::default();
        config.endpoint = "http://127.0.0.1:9/unreachable".to_string();
        let provider = GoogleTranslateProvider::new(&config).unwrap();
        let fr = LanguageCode::new("fr").unwrap();
        let translated = tokio_test::block_on(provider.translate(&fr, &[])).unwrap();
        assert!(translated.is_empty());
    }
}
