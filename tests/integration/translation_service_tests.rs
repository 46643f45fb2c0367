/*!
 * Integration tests for the translation service: glossary mapping around a provider call
 */

use chapterwai::errors::{ProviderError, TranslationError};
use chapterwai::providers::mock::MockProvider;
use chapterwai::translation::{GlossaryMap, TranslationOptions, TranslationService};
use crate::common;

fn service(provider: MockProvider) -> TranslationService {
    TranslationService::with_provider(Box::new(provider), "zh", "en")
}

/// The provider only ever sees marker tokens in place of glossary terms
#[tokio::test]
async fn test_translate_text_withGlossary_shouldHideTermsFromProvider() {
    let provider = MockProvider::echo();
    let counter = provider.clone();
    let service = service(provider);

    let result = service
        .translate_text("张三与李四同行", &common::sample_glossary())
        .await
        .unwrap();

    assert_eq!(result.target_text, "Zhang San与Li Si同行");
    assert!(result.residual_markers.is_empty());
    assert_eq!(result.substitutions, 2);
    assert_eq!(counter.request_count(), 1);
}

/// A provider that translates around the tokens gets the terms restored
#[tokio::test]
async fn test_translate_text_withTokenPreservingProvider_shouldRestoreAllTerms() {
    fn translate_tokens(text: &str) -> String {
        text.replace("与", " walked with ").replace("同行", "")
    }
    let service = service(MockProvider::echo().with_custom_response(translate_tokens));

    let result = service
        .translate_text("张三与李四同行", &common::sample_glossary())
        .await
        .unwrap();

    assert_eq!(result.target_text, "Zhang San walked with Li Si");
    assert!(result.is_clean());
}

/// A provider that mangles a token leaks the mangled text; nothing fails
#[tokio::test]
async fn test_translate_text_withMangledToken_shouldLeaveMangledTextInPlace() {
    fn drop_brackets(text: &str) -> String {
        text.replacen('«', "<<", 1).replacen('»', ">>", 1)
    }
    let service = service(MockProvider::echo().with_custom_response(drop_brackets));

    let result = service
        .translate_text("张三与李四同行", &common::sample_glossary())
        .await
        .unwrap();

    // The first token is no longer recognizable and stays as mangled text
    assert!(result.target_text.starts_with("<<0>>"));
    assert!(result.target_text.contains("Li Si"));
    assert!(result.residual_markers.is_empty());
}

/// An unknown marker-shaped token in the reply is surfaced as residual
#[tokio::test]
async fn test_translate_text_withInventedToken_shouldFlagIt() {
    let service = service(MockProvider::echo().with_reply("«0» and «1» met «9»."));

    let result = service
        .translate_text("张三见李四", &common::sample_glossary())
        .await
        .unwrap();

    assert_eq!(result.target_text, "Zhang San and Li Si met «9».");
    assert_eq!(result.residual_markers, vec!["«9»".to_string()]);
    assert!(!result.is_clean());
}

/// Notes requested through the options come back from the envelope
#[tokio::test]
async fn test_translate_text_withNotes_shouldReturnNotes() {
    let provider = MockProvider::echo()
        .with_reply("{\"translation\": \"«0» laughed.\", \"notes\": [\"Laugh is a pun in the source.\"]}");
    let service = service(provider).with_options(TranslationOptions {
        style_hint: "light".to_string(),
        want_notes: true,
    });

    let result = service
        .translate_text("张三笑了。", &common::sample_glossary())
        .await
        .unwrap();

    assert_eq!(result.target_text, "Zhang San laughed.");
    assert_eq!(result.notes, vec!["Laugh is a pun in the source.".to_string()]);
}

/// Windows line endings are normalized before mapping
#[tokio::test]
async fn test_translate_text_withCrlf_shouldNormalizeLineEndings() {
    let service = service(MockProvider::echo());

    let result = service
        .translate_text("张三\r\n李四", &common::sample_glossary())
        .await
        .unwrap();

    assert_eq!(result.target_text, "Zhang San\nLi Si");
}

/// Provider errors propagate unchanged, no partial result
#[tokio::test]
async fn test_translate_text_withProviderError_shouldPropagate() {
    let provider = MockProvider::echo().with_failure(ProviderError::configuration("mock", "API key is missing"));
    let service = service(provider);

    let result = service.translate_text("张三", &GlossaryMap::new()).await;

    assert!(matches!(
        result,
        Err(TranslationError::Provider(ProviderError::Configuration { .. }))
    ));
}

/// Two-pass on a provider without chat support is a configuration error
#[tokio::test]
async fn test_translate_with_pipeline_withNonChatProvider_shouldFail() {
    let config = chapterwai::app_config::Config {
        translation: chapterwai::app_config::TranslationConfig {
            provider: chapterwai::app_config::TranslationProvider::LibreTranslate,
            ..Default::default()
        },
        ..Default::default()
    };
    let service = TranslationService::new(&config);

    assert!(!service.supports_pipeline());
    let result = service
        .translate_with_pipeline("张三", &common::sample_glossary(), None)
        .await;

    assert!(matches!(
        result,
        Err(TranslationError::Provider(ProviderError::Configuration { .. }))
    ));
}
