use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::providers::{DEFAULT_TIMEOUT_SECS, Provider, build_client};
use crate::translation::model::{TranslationRequest, TranslationResult};

const PROVIDER_NAME: &str = "libretranslate";
const DEFAULT_ENDPOINT: &str = "https://libretranslate.com";
const PUBLIC_HOST: &str = "libretranslate.com";

/// LibreTranslate client (form-encoded `/translate` endpoint)
#[derive(Debug)]
pub struct LibreTranslate {
    client: Client,
    /// API key; the public instance requires one, self-hosted servers usually not
    api_key: String,
    /// Server base URL (empty means the public instance)
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct LibreTranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl LibreTranslate {
    /// Create a new LibreTranslate client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: build_client(DEFAULT_TIMEOUT_SECS),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = build_client(timeout_secs);
        self
    }

    /// Full URL of the translate endpoint
    pub fn api_url(&self) -> String {
        let base = if self.endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/translate", base)
    }

    /// Whether requests go to the public libretranslate.com instance
    pub fn is_public_instance(&self) -> bool {
        let url = self.api_url();
        url::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .is_some_and(|host| host == PUBLIC_HOST)
    }

    /// Form fields for a request; `api_key` is only sent when one is set
    pub fn form_fields<'a>(&'a self, request: &'a TranslationRequest) -> Vec<(&'static str, &'a str)> {
        let mut fields = vec![
            ("q", request.text.as_str()),
            ("source", request.source_language.as_str()),
            ("target", request.target_language.as_str()),
            ("format", "text"),
        ];
        if !self.api_key.trim().is_empty() {
            fields.push(("api_key", self.api_key.as_str()));
        }
        fields
    }

    /// Pull the translation out of a response body, falling back to the raw body
    pub fn parse_body(body: &str) -> Result<String, ProviderError> {
        if body.trim().is_empty() {
            return Err(ProviderError::ParseError("Empty response from LibreTranslate".to_string()));
        }

        match serde_json::from_str::<LibreTranslateResponse>(body) {
            Ok(response) => Ok(response.translated_text),
            Err(e) => {
                warn!("Unexpected LibreTranslate response shape ({}); using raw body", e);
                Ok(body.to_string())
            }
        }
    }
}

#[async_trait]
impl Provider for LibreTranslate {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult, ProviderError> {
        if self.api_key.trim().is_empty() && self.is_public_instance() {
            return Err(ProviderError::configuration(
                PROVIDER_NAME,
                "API key is missing (required by libretranslate.com; set an endpoint for a self-hosted server)",
            ));
        }

        let response = self
            .client
            .post(self.api_url())
            .form(&self.form_fields(request))
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read LibreTranslate response: {}", e)))?;

        if !status.is_success() {
            error!("LibreTranslate API error ({}): {}", status, body);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: body,
            });
        }

        Self::parse_body(&body).map(TranslationResult::text)
    }
}
