/*!
 * Integration tests for the two-pass analyze-then-translate pipeline
 */

use chapterwai::errors::{PipelineStage, ProviderError, TranslationError};
use chapterwai::providers::mock::MockProvider;
use chapterwai::translation::{map_terms, GlossaryMap, TranslationPipeline, TranslationService};
use crate::common;

const ANALYSIS_REPLY: &str = r#"Here is the analysis:
```json
{
  "chapterTitle": "第一章 青云山",
  "workTitle": "Azure Cloud Chronicles",
  "characters": [
    {"sourceName": "«0»", "targetName": "«0»", "gender": "male"}
  ],
  "terminology": [{"term": "山门", "meaning": "mountain gate"}],
  "recurringThemes": ["sect rivalry"]
}
```"#;

/// The grounded prompt sees the analysis, and the title line is dropped from the output
#[tokio::test]
async fn test_run_withStructuredAnalysis_shouldGroundTranslation() {
    let mapped = map_terms("第一章 青云山\n\n张三来到山门前。", &common::sample_glossary());
    let provider = MockProvider::echo()
        .with_reply(ANALYSIS_REPLY)
        .with_reply("第一章 青云山\n\n«0» arrived at the mountain gate.");
    let pipeline = TranslationPipeline::for_languages(&provider, "zh", "en");

    let output = pipeline.run(&mapped.text, "literary", None).await.unwrap();

    assert!(!output.analysis_degraded);
    assert_eq!(output.extracted_context.work_title, "Azure Cloud Chronicles");
    assert_eq!(mapped.restore(&output.target_text), "Zhang San arrived at the mountain gate.");

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(!prompts[0].user.contains("张三"));
    assert!(prompts[1].user.contains("mountain gate"));
    assert!(prompts[1].user.contains("sect rivalry"));
    assert!(prompts[1].user.contains("literary"));
}

/// Garbage from the analysis step degrades to a default context and translation still runs
#[tokio::test]
async fn test_run_withInvalidAnalysis_shouldFallBackAndTranslate() {
    let provider = MockProvider::echo()
        .with_reply("I could not analyze this chapter.")
        .with_reply("Zhang San arrived.");
    let pipeline = TranslationPipeline::for_languages(&provider, "zh", "en");

    let output = pipeline.run("张三来了。", "", None).await.unwrap();

    assert!(output.analysis_degraded);
    assert_eq!(output.target_text, "Zhang San arrived.");
    assert!(output.notes.is_empty());
    assert!(output.extracted_context.characters.is_empty());
    assert!(output.extracted_context.terminology.is_empty());
    assert!(output.extracted_context.recurring_themes.is_empty());
    assert_eq!(output.extracted_context.work_title, "unknown");
    assert_eq!(provider.request_count(), 2);
}

/// A failure in the translate step aborts the run and names the stage
#[tokio::test]
async fn test_run_withTranslateFailure_shouldAbortWithStage() {
    let provider = MockProvider::echo()
        .with_reply(ANALYSIS_REPLY)
        .with_failure(ProviderError::ApiError {
            status_code: 500,
            message: "overloaded".to_string(),
        });
    let pipeline = TranslationPipeline::for_languages(&provider, "zh", "en");

    let result = pipeline.run("张三来了。", "", None).await;

    match result {
        Err(TranslationError::Pipeline { stage, source }) => {
            assert_eq!(stage, PipelineStage::Translate);
            assert_eq!(source.status_code(), Some(500));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

/// Through the service, terms are mapped before both passes and restored after
#[tokio::test]
async fn test_translate_with_pipeline_shouldRestoreTermsAndKeepContext() {
    let provider = MockProvider::echo()
        .with_reply(ANALYSIS_REPLY)
        .with_reply("«0» and «1» walked up «2».");
    let service = TranslationService::with_provider(Box::new(provider), "zh", "en");

    let result = service
        .translate_with_pipeline("张三与李四走上青云山。", &common::sample_glossary(), Some("Chapter 1"))
        .await
        .unwrap();

    assert_eq!(result.target_text, "Zhang San and Li Si walked up Azure Cloud Mountain.");
    assert!(result.is_clean());
    assert!(!result.analysis_degraded);
    let context = result.extracted_context.unwrap();
    assert_eq!(context.recurring_themes, vec!["sect rivalry".to_string()]);
}

/// Source-side context fields get the source terms back, rendered names get the targets
#[tokio::test]
async fn test_translate_with_pipeline_shouldRestoreContextBySide() {
    let glossary = GlossaryMap::from_pairs([("张三", "Zhang San"), ("青云门", "Azure Cloud Sect")]).unwrap();
    let provider = MockProvider::echo()
        .with_reply(
            r#"{"chapterTitle": "«1»", "workTitle": "unknown",
                "characters": [{"sourceName": "«0»", "targetName": "«0»"}],
                "terminology": [{"term": "«1»", "meaning": "the sect «0» joins"}]}"#,
        )
        .with_reply("«0» joined «1».");
    let service = TranslationService::with_provider(Box::new(provider), "zh", "en");

    let result = service
        .translate_with_pipeline("张三拜入青云门。", &glossary, None)
        .await
        .unwrap();

    assert_eq!(result.target_text, "Zhang San joined Azure Cloud Sect.");
    let context = result.extracted_context.unwrap();
    assert_eq!(context.chapter_title.as_deref(), Some("青云门"));
    assert_eq!(context.characters[0].source_name, "张三");
    assert_eq!(context.characters[0].target_name, "Zhang San");
    assert_eq!(context.terminology[0].term, "青云门");
    assert_eq!(context.terminology[0].meaning, "the sect Zhang San joins");
}
