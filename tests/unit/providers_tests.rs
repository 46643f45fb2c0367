/*!
 * Tests for the provider implementations
 *
 * Nothing here reaches a real service: clients either fail before sending
 * anything or talk to a one-shot local listener.
 */

use chapterwai::app_config::{TranslationConfig, TranslationProvider};
use chapterwai::errors::ProviderError;
use chapterwai::providers::anthropic::Anthropic;
use chapterwai::providers::huggingface::HuggingFace;
use chapterwai::providers::libretranslate::LibreTranslate;
use chapterwai::providers::mock::MockProvider;
use chapterwai::providers::openai::OpenAI;
use chapterwai::providers::{ChatProvider, Provider, ProviderClient, chat_prompts};
use chapterwai::translation::{GlossaryMap, TranslationRequest};
use crate::common;

fn request() -> TranslationRequest {
    TranslationRequest::new("«0»来了。", "zh", "en")
}

fn assert_configuration_error(result: Result<chapterwai::translation::TranslationResult, ProviderError>, provider: &str) {
    match result {
        Err(ProviderError::Configuration { provider: name, .. }) => assert_eq!(name, provider),
        other => panic!("expected a configuration error for {}, got {:?}", provider, other),
    }
}

/// Test that OpenAI refuses to run without a key
#[tokio::test]
async fn test_openai_translate_withoutApiKey_shouldFailFast() {
    // Unroutable endpoint: reaching the network would surface a connection error instead
    let client = OpenAI::new("", "http://127.0.0.1:9");

    assert_configuration_error(client.translate(&request()).await, "openai");
}

/// Test that Anthropic refuses to run without a key
#[tokio::test]
async fn test_anthropic_translate_withoutApiKey_shouldFailFast() {
    let client = Anthropic::new("", "http://127.0.0.1:9");

    assert_configuration_error(client.translate(&request()).await, "anthropic");
}

/// Test that HuggingFace refuses to run without a token
#[tokio::test]
async fn test_huggingface_translate_withoutApiKey_shouldFailFast() {
    let client = HuggingFace::new("  ", "http://127.0.0.1:9");

    assert_configuration_error(client.translate(&request()).await, "huggingface");
}

/// Test that the public LibreTranslate instance refuses to run without a key
#[tokio::test]
async fn test_libretranslate_translate_withoutApiKeyOnPublicInstance_shouldFailFast() {
    let client = LibreTranslate::new("", "");

    assert_configuration_error(client.translate(&request()).await, "libretranslate");
}

/// A self-hosted LibreTranslate server works without a key
#[tokio::test]
async fn test_libretranslate_translate_withoutApiKeyOnSelfHosted_shouldTranslate() {
    let endpoint = common::serve_once("200 OK", r#"{"translatedText":"«0» came."}"#).await;
    let client = LibreTranslate::new("", endpoint);

    let result = client.translate(&request()).await.unwrap();

    assert_eq!(result.target_text, "«0» came.");
}

/// A non-success status surfaces as an API error carrying the status code
#[tokio::test]
async fn test_openai_translate_withServerError_shouldReturnApiError() {
    let endpoint = common::serve_once("500 Internal Server Error", "upstream overloaded").await;
    let client = OpenAI::new("test-key", endpoint);

    let error = client.translate(&request()).await.unwrap_err();

    assert!(matches!(error, ProviderError::ApiError { .. }));
    assert_eq!(error.status_code(), Some(500));
}

/// Same status mapping for the form-encoded backend
#[tokio::test]
async fn test_libretranslate_translate_withServerError_shouldReturnApiError() {
    let endpoint = common::serve_once("503 Service Unavailable", "busy").await;
    let client = LibreTranslate::new("", endpoint);

    let error = client.translate(&request()).await.unwrap_err();

    assert_eq!(error.status_code(), Some(503));
}

/// A plain-text body instead of the chat envelope comes back as the translation
#[tokio::test]
async fn test_openai_translate_withPlainTextBody_shouldUseRawBody() {
    let endpoint = common::serve_once("200 OK", "«0» came.").await;
    let client = OpenAI::new("test-key", endpoint);

    let result = client.translate(&request()).await.unwrap();

    assert_eq!(result.target_text, "«0» came.");
    assert!(result.notes.is_empty());
}

/// Anthropic chat falls back to the raw body the same way
#[tokio::test]
async fn test_anthropic_chat_withPlainTextBody_shouldReturnRawBody() {
    let endpoint = common::serve_once("200 OK", "not an envelope").await;
    let client = Anthropic::new("test-key", endpoint);

    let reply = client.chat("system", "user").await.unwrap();

    assert_eq!(reply, "not an envelope");
}

/// A configured timeout ends a hung call as a connection error
#[tokio::test]
async fn test_openai_translate_withSilentServer_shouldTimeOut() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
    });
    let client = OpenAI::new("test-key", endpoint).with_timeout(1);

    let result = client.translate(&request()).await;

    assert!(matches!(result, Err(ProviderError::ConnectionError(_))));
}

/// Glossary hints attached to a request reach the chat prompt
#[test]
fn test_chat_prompts_withGlossaryHints_shouldListTerms() {
    let glossary = GlossaryMap::from_pairs([("青云门", "Azure Cloud Sect")]).unwrap();
    let request = request().glossary(glossary);

    let (_, user) = chat_prompts(&request);

    assert!(user.contains("青云门 → Azure Cloud Sect"));
}

/// Endpoint URLs are derived from the configured base
#[test]
fn test_api_url_withCustomEndpoint_shouldAppendRoute() {
    assert_eq!(
        OpenAI::new("k", "http://localhost:1234/v1/").api_url(),
        "http://localhost:1234/v1/chat/completions"
    );
    assert_eq!(
        HuggingFace::new("k", "").with_model("Helsinki-NLP/opus-mt-ja-en").api_url(),
        "https://api-inference.huggingface.co/models/Helsinki-NLP/opus-mt-ja-en"
    );
    assert_eq!(
        LibreTranslate::new("k", "http://localhost:5000").api_url(),
        "http://localhost:5000/translate"
    );
}

/// Unexpected response shapes fall back to the raw body
#[test]
fn test_parse_body_withUnexpectedShape_shouldReturnRawBody() {
    assert_eq!(HuggingFace::parse_body("plain words").unwrap(), "plain words");
    assert_eq!(LibreTranslate::parse_body("{\"error\": 1}").unwrap(), "{\"error\": 1}");
    assert_eq!(
        LibreTranslate::parse_body("{\"translatedText\": \"«0» came.\"}").unwrap(),
        "«0» came."
    );
    assert!(matches!(HuggingFace::parse_body(""), Err(ProviderError::ParseError(_))));
}

/// The configured provider is selected and only chat models expose chat
#[test]
fn test_provider_client_from_config_shouldSelectConfiguredProvider() {
    for provider in TranslationProvider::ALL {
        let config = TranslationConfig {
            provider,
            ..TranslationConfig::default()
        };

        let client = ProviderClient::from_config(&config);

        assert_eq!(client.name(), provider.to_lowercase_string());
        assert_eq!(client.as_chat().is_some(), provider.is_chat_model());
    }
}

/// Providers never change the request they are given
#[tokio::test]
async fn test_translate_shouldNotMutateRequest() {
    let provider = MockProvider::echo();
    let request = request().style_hint("terse");
    let before = request.clone();

    let result = provider.translate(&request).await.unwrap();

    assert_eq!(request, before);
    assert_eq!(result.target_text, "«0»来了。");
}

/// Intermittent mock fails on schedule and counts every call
#[tokio::test]
async fn test_mock_intermittent_shouldFailEveryNthRequest() {
    let provider = MockProvider::intermittent(2);

    assert!(provider.translate(&request()).await.is_ok());
    assert!(provider.translate(&request()).await.is_err());
    assert!(provider.translate(&request()).await.is_ok());
    assert_eq!(provider.request_count(), 3);
}
