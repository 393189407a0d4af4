//! OpenAI-compatible chat completion backend.

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use super::{Classification, Classifier, ClassifierError, MAX_OUTPUT_TOKENS, parse_verdict};

/// Classifier backed by any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClassifier {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl OpenAiClassifier {
    pub fn new(api_key: String, base_url: String, model: String, system_prompt: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);

        Self {
            client: Client::with_config(config),
            model,
            system_prompt,
        }
    }

    #[allow(deprecated)]
    fn build_request(&self, text: &str) -> Result<CreateChatCompletionRequest, ClassifierError> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(self.system_prompt.as_str())
            .build()
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(text)
            .build()
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![system.into(), user.into()];

        CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .max_tokens(MAX_OUTPUT_TOKENS)
            .temperature(0.0_f32)
            .build()
            .map_err(|e| ClassifierError::Transport(e.to_string()))
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    fn name(&self) -> &str {
        "openai"
    }

    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let request = self.build_request(text)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        let answer = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or(ClassifierError::Empty)?;

        parse_verdict(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(deprecated)]
    fn test_request_carries_prompt_and_caps() {
        let classifier = OpenAiClassifier::new(
            "sk-test".into(),
            "http://localhost:9/v1".into(),
            "tiny-model".into(),
            "moderate".into(),
        );

        let request = classifier.build_request("buy cheap stuff").unwrap();
        assert_eq!(request.model, "tiny-model");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.max_tokens, Some(MAX_OUTPUT_TOKENS));
        assert_eq!(request.temperature, Some(0.0));
    }
}
