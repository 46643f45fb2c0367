use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{DEFAULT_TIMEOUT_SECS, Provider, build_client};
use crate::translation::model::{TranslationRequest, TranslationResult};

const PROVIDER_NAME: &str = "huggingface";
const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co";
const DEFAULT_MODEL: &str = "Helsinki-NLP/opus-mt-zh-en";

/// Client for the hosted inference API serving translation models
///
/// These models take plain text only: style hints, glossary hints and notes
/// are ignored.
#[derive(Debug)]
pub struct HuggingFace {
    client: Client,
    /// Access token
    api_key: String,
    /// Inference base URL (empty means the public API)
    endpoint: String,
    /// Model repository id, e.g. `Helsinki-NLP/opus-mt-zh-en`
    model: String,
}

/// Inference request body
#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a> {
    pub inputs: &'a str,
}

/// One element of an inference response
///
/// Translation pipelines answer with `translation_text`, text-generation
/// models with `generated_text`.
#[derive(Debug, Deserialize)]
pub struct InferenceOutput {
    #[serde(default)]
    pub translation_text: Option<String>,
    #[serde(default)]
    pub generated_text: Option<String>,
}

impl InferenceOutput {
    fn text(&self) -> Option<&str> {
        self.translation_text
            .as_deref()
            .or(self.generated_text.as_deref())
    }
}

impl HuggingFace {
    /// Create a new inference client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: build_client(DEFAULT_TIMEOUT_SECS),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Set the model repository id
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = build_client(timeout_secs);
        self
    }

    /// Full URL of the model endpoint
    pub fn api_url(&self) -> String {
        let base = if self.endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/models/{}", base, self.model)
    }

    /// Pull the translation out of a response body.
    ///
    /// Accepts a list of outputs or a single output object; anything else
    /// is returned as-is.
    pub fn parse_body(body: &str) -> Result<String, ProviderError> {
        if body.trim().is_empty() {
            return Err(ProviderError::ParseError("Empty response from HuggingFace".to_string()));
        }

        if let Ok(outputs) = serde_json::from_str::<Vec<InferenceOutput>>(body) {
            let text: Vec<&str> = outputs.iter().filter_map(InferenceOutput::text).collect();
            if !text.is_empty() {
                return Ok(text.join("\n"));
            }
        } else if let Ok(output) = serde_json::from_str::<InferenceOutput>(body) {
            if let Some(text) = output.text() {
                return Ok(text.to_string());
            }
        }

        warn!("Unexpected HuggingFace response shape; using raw body");
        Ok(body.to_string())
    }
}

#[async_trait]
impl Provider for HuggingFace {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::configuration(PROVIDER_NAME, "access token is missing"));
        }
        if self.model.trim().is_empty() {
            return Err(ProviderError::configuration(PROVIDER_NAME, "model is missing"));
        }

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.api_key)
            .json(&InferenceRequest { inputs: &request.text })
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read HuggingFace response: {}", e)))?;

        if !status.is_success() {
            error!("HuggingFace API error ({}): {}", status, body);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: body,
            });
        }

        Self::parse_body(&body).map(TranslationResult::text)
    }
}
