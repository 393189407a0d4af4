//! Google Gemini `generateContent` backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Classification, Classifier, ClassifierError, MAX_OUTPUT_TOKENS, parse_verdict};

#[derive(Debug, Serialize, Deserialize, Default)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

/// Header carrying the API key, so it never appears in request URLs.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Classifier backed by the Gemini REST API.
pub struct GeminiClassifier {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    system_prompt: String,
}

impl GeminiClassifier {
    pub fn new(api_key: String, base_url: String, model: String, system_prompt: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            system_prompt,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(&self, text: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(self.system_prompt.clone()),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(text.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }
}

/// Concatenate the text parts of the first candidate.
fn answer_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates?.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    Some(text)
}

#[async_trait]
impl Classifier for GeminiClassifier {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&self.build_request(text))
            .send()
            .await
            .map_err(|e| ClassifierError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Transport(format!("HTTP {}: {}", status, body)));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Malformed(e.without_url().to_string()))?;

        let answer = answer_text(body).ok_or(ClassifierError::Empty)?;
        parse_verdict(&answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let classifier = GeminiClassifier::new(
            "key".into(),
            "https://example.test/".into(),
            "gemini-1.5-flash".into(),
            "moderate".into(),
        );

        assert_eq!(
            classifier.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );

        let json = serde_json::to_value(classifier.build_request("hi")).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "moderate");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], MAX_OUTPUT_TOKENS);
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let classifier = GeminiClassifier::new(
            "SECRETKEY-abcdef-123456".into(),
            "http://127.0.0.1:9".into(),
            "m".into(),
            "moderate".into(),
        );

        let err = classifier.classify("hi").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Transport(_)));
        assert!(!err.to_string().contains("SECRETKEY"));
    }

    #[test]
    fn test_answer_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"NOT"},{"text":"_AD"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(answer_text(response).as_deref(), Some("NOT_AD"));

        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert_eq!(answer_text(blocked), None);
    }
}
