/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported backends:
 * - OpenAI: chat-completions API (also any OpenAI-compatible server)
 * - Anthropic: messages API
 * - HuggingFace: hosted inference endpoint for translation models
 * - LibreTranslate: free translation HTTP endpoint (form-encoded)
 *
 * Every client checks its credentials before building a request, so a
 * missing key fails fast with `ProviderError::Configuration`. No client
 * retries: a failed call is reported once.
 */

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::fmt::Debug;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;
use crate::language_utils::language_label;
use crate::translation::formatting::OutputCleaner;
use crate::translation::model::{TranslationRequest, TranslationResult};
use crate::translation::prompts::{NotedTranslation, TranslationPromptBuilder};

pub mod anthropic;
pub mod huggingface;
pub mod libretranslate;
pub mod mock;
pub mod openai;

use anthropic::Anthropic;
use huggingface::HuggingFace;
use libretranslate::LibreTranslate;
use openai::OpenAI;

/// Request timeout applied when the configuration does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// HTTP client shared by the network providers.
///
/// A timeout of 0 leaves requests unbounded.
pub(crate) fn build_client(timeout_secs: u64) -> Client {
    let builder = Client::builder();
    let builder = if timeout_secs > 0 {
        builder.timeout(Duration::from_secs(timeout_secs))
    } else {
        builder
    };
    builder.build().unwrap_or_default()
}

/// Common trait for all translation providers
///
/// Implementations must accept an empty glossary and must not retry.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short provider identifier used in logs and errors
    fn name(&self) -> &str;

    /// Translate a request
    ///
    /// # Arguments
    /// * `request` - The request to translate; never modified
    ///
    /// # Returns
    /// * `Result<TranslationResult, ProviderError>` - Translated text and notes, or an error
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult, ProviderError>;

    /// The chat-capable view of this provider, if it has one
    fn as_chat(&self) -> Option<&dyn ChatProvider> {
        None
    }
}

/// Providers backed by a general chat model
///
/// The two-pass pipeline needs free-form completions (the analysis step
/// returns JSON, not a translation), so it is written against this trait.
#[async_trait]
pub trait ChatProvider: Provider {
    /// Send one system + user exchange and return the raw reply text
    async fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

/// Build the prompts a chat model receives for a plain translation request.
pub fn chat_prompts(request: &TranslationRequest) -> (String, String) {
    TranslationPromptBuilder::new(
        &language_label(&request.source_language),
        &language_label(&request.target_language),
    )
    .with_text(&request.text)
    .with_style_hint(&request.style_hint)
    .with_glossary(&request.glossary)
    .with_notes(request.want_notes)
    .build()
}

/// Turn a chat reply into a translation result.
///
/// With notes requested the reply should be a JSON envelope; anything that
/// does not parse is treated as the translated text itself with no notes.
pub fn parse_chat_reply(reply: &str, want_notes: bool) -> Result<TranslationResult, ProviderError> {
    if reply.trim().is_empty() {
        return Err(ProviderError::ParseError("Empty response from provider".to_string()));
    }

    if want_notes {
        if let Some(json) = OutputCleaner::extract_json(reply) {
            if let Ok(noted) = serde_json::from_str::<NotedTranslation>(&json) {
                return Ok(TranslationResult {
                    target_text: noted.translation.trim().to_string(),
                    notes: noted.notes,
                });
            }
        }
        debug!("Notes envelope missing from reply; using raw text");
    }

    Ok(TranslationResult::text(OutputCleaner::strip_code_fence(reply)))
}

/// Translate through a chat provider using the standard prompts.
pub async fn translate_via_chat<P: ChatProvider + ?Sized>(
    provider: &P,
    request: &TranslationRequest,
) -> Result<TranslationResult, ProviderError> {
    let (system, user) = chat_prompts(request);
    let reply = provider.chat(&system, &user).await?;
    parse_chat_reply(&reply, request.want_notes)
}

/// Configured provider, selected by the `translation.provider` setting
#[derive(Debug)]
pub enum ProviderClient {
    /// OpenAI chat-completions client
    OpenAI(OpenAI),
    /// Anthropic messages client
    Anthropic(Anthropic),
    /// HuggingFace inference client
    HuggingFace(HuggingFace),
    /// LibreTranslate client
    LibreTranslate(LibreTranslate),
}

impl ProviderClient {
    /// Build the active provider from configuration.
    ///
    /// Construction never contacts the network and never fails on missing
    /// credentials; those are reported by the first call.
    pub fn from_config(config: &TranslationConfig) -> Self {
        let api_key = config.get_api_key();
        let endpoint = config.get_endpoint();
        let model = config.get_model();
        let timeout_secs = config.get_timeout_secs();

        match config.provider {
            TranslationProvider::OpenAI => Self::OpenAI(
                OpenAI::new(api_key, endpoint)
                    .with_model(model)
                    .with_temperature(config.common.temperature)
                    .with_max_tokens(config.common.max_tokens)
                    .with_timeout(timeout_secs),
            ),
            TranslationProvider::Anthropic => Self::Anthropic(
                Anthropic::new(api_key, endpoint)
                    .with_model(model)
                    .with_temperature(config.common.temperature)
                    .with_max_tokens(config.common.max_tokens)
                    .with_timeout(timeout_secs),
            ),
            TranslationProvider::HuggingFace => Self::HuggingFace(
                HuggingFace::new(api_key, endpoint)
                    .with_model(model)
                    .with_timeout(timeout_secs),
            ),
            TranslationProvider::LibreTranslate => Self::LibreTranslate(
                LibreTranslate::new(api_key, endpoint).with_timeout(timeout_secs),
            ),
        }
    }

    fn inner(&self) -> &dyn Provider {
        match self {
            Self::OpenAI(client) => client,
            Self::Anthropic(client) => client,
            Self::HuggingFace(client) => client,
            Self::LibreTranslate(client) => client,
        }
    }
}

#[async_trait]
impl Provider for ProviderClient {
    fn name(&self) -> &str {
        self.inner().name()
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult, ProviderError> {
        self.inner().translate(request).await
    }

    fn as_chat(&self) -> Option<&dyn ChatProvider> {
        self.inner().as_chat()
    }
}
