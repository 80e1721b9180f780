//! Language-model implementations.

use super::LanguageModel;
use crate::errors::DevflowError;
use crate::utils::preview;
use async_trait::async_trait;

/// Stand-in model that echoes the start of each prompt.
///
/// Output format: `[LLM Response to: <first 50 chars>...]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderModel;

#[async_trait]
impl LanguageModel for PlaceholderModel {
    async fn complete(&self, prompt: &str, _system_prompt: Option<&str>) -> Result<String, DevflowError> {
        Ok(format!("[LLM Response to: {}...]", preview(prompt, 50)))
    }

    fn name(&self) -> &str {
        "placeholder"
    }
}

#[cfg(feature = "http")]
pub use http::OpenAiCompatibleModel;

#[cfg(feature = "http")]
mod http {
    use super::{async_trait, DevflowError, LanguageModel};
    use serde::Deserialize;

    /// Chat-completions client for OpenAI-compatible endpoints.
    #[derive(Debug, Clone)]
    pub struct OpenAiCompatibleModel {
        client: reqwest::Client,
        endpoint: String,
        model: String,
        api_key: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct ChatResponse {
        choices: Vec<Choice>,
    }

    #[derive(Debug, Deserialize)]
    struct Choice {
        message: ChoiceMessage,
    }

    #[derive(Debug, Deserialize)]
    struct ChoiceMessage {
        #[serde(default)]
        content: Option<String>,
    }

    impl OpenAiCompatibleModel {
        /// Creates a client for `endpoint` (the full chat-completions URL).
        #[must_use]
        pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
            Self {
                client: reqwest::Client::new(),
                endpoint: endpoint.into(),
                model: model.into(),
                api_key,
            }
        }

        fn request_body(&self, prompt: &str, system_prompt: Option<&str>) -> serde_json::Value {
            let mut messages = Vec::with_capacity(2);
            if let Some(system) = system_prompt {
                messages.push(serde_json::json!({"role": "system", "content": system}));
            }
            messages.push(serde_json::json!({"role": "user", "content": prompt}));
            serde_json::json!({"model": self.model, "messages": messages})
        }
    }

    #[async_trait]
    impl LanguageModel for OpenAiCompatibleModel {
        async fn complete(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String, DevflowError> {
            let mut request = self
                .client
                .post(&self.endpoint)
                .json(&self.request_body(prompt, system_prompt));
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = request
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| DevflowError::LanguageModel(e.to_string()))?;
            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| DevflowError::LanguageModel(e.to_string()))?;

            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| DevflowError::LanguageModel("response contained no content".to_string()))
        }

        fn name(&self) -> &str {
            &self.model
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_request_body_with_system_prompt() {
            let model = OpenAiCompatibleModel::new("http://localhost/v1/chat/completions", "m", None);
            let body = model.request_body("hi", Some("be brief"));
            assert_eq!(body["model"], "m");
            assert_eq!(body["messages"][0]["role"], "system");
            assert_eq!(body["messages"][1]["content"], "hi");
        }

        #[test]
        fn test_response_parsing() {
            let raw = r#"{"choices":[{"message":{"role":"assistant","content":"done"}}]}"#;
            let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
            assert_eq!(parsed.choices[0].message.content.as_deref(), Some("done"));
        }
    }
}
