/*!
 * Pipeline orchestrator for the two-pass chapter translation.
 *
 * The orchestrator runs:
 * 1. Analysis Pass: infer characters, terminology, themes and the chapter title
 * 2. Translation Pass: translate the same text grounded in that context
 *
 * The second pass always runs, even on a degraded analysis. A provider
 * failure in either pass aborts the run with `TranslationError::Pipeline`
 * naming the failing stage. Nothing is retried.
 */

use log::info;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::errors::{PipelineStage, TranslationError};
use crate::language_utils::language_label;
use crate::providers::ChatProvider;
use crate::translation::model::ExtractedContext;

use super::analysis_pass::{AnalysisOutcome, AnalysisPass};
use super::translation_pass::TranslationPass;

/// Configuration for the translation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source language code
    pub source_language: String,

    /// Target language code
    pub target_language: String,
}

impl PipelineConfig {
    /// Create a new pipeline configuration.
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        }
    }
}

/// Result of a complete pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Translated chapter body
    pub target_text: String,

    /// Always empty: the grounded translation prompt does not ask for notes
    pub notes: Vec<String>,

    /// Context the translation was grounded in
    pub extracted_context: ExtractedContext,

    /// Whether the analysis reply was unusable and the fallback context was used
    pub analysis_degraded: bool,
}

/// Timing of one pipeline run, for logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineTimings {
    pub analysis: Duration,
    pub translation: Duration,
}

/// The main translation pipeline orchestrator.
pub struct TranslationPipeline<'a> {
    provider: &'a dyn ChatProvider,
    analysis_pass: AnalysisPass,
    translation_pass: TranslationPass,
}

impl<'a> TranslationPipeline<'a> {
    /// Create a new pipeline over a chat provider.
    pub fn new(provider: &'a dyn ChatProvider, config: &PipelineConfig) -> Self {
        let source = language_label(&config.source_language);
        let target = language_label(&config.target_language);

        Self {
            provider,
            analysis_pass: AnalysisPass::new(&source, &target),
            translation_pass: TranslationPass::new(&source, &target),
        }
    }

    /// Create a pipeline for the given language codes.
    pub fn for_languages(provider: &'a dyn ChatProvider, source_language: &str, target_language: &str) -> Self {
        Self::new(provider, &PipelineConfig::new(source_language, target_language))
    }

    /// Analyze, then translate, one chapter.
    ///
    /// # Arguments
    /// * `source_text` - Chapter text (usually already glossary-mapped)
    /// * `style_hint` - Free-form style guidance; may be empty
    /// * `chapter_title_hint` - Title known to the caller, if any
    pub async fn run(
        &self,
        source_text: &str,
        style_hint: &str,
        chapter_title_hint: Option<&str>,
    ) -> Result<PipelineOutput, TranslationError> {
        let mut timings = PipelineTimings::default();

        // Phase 1: Analysis
        info!("Pipeline: analyzing chapter with {}", self.provider.name());
        let started = Instant::now();
        let outcome = self.analyze(source_text, chapter_title_hint).await?;
        timings.analysis = started.elapsed();

        let analysis_degraded = outcome.is_degraded();
        let context = outcome.into_context();

        // Phase 2: Translation
        info!(
            "Pipeline: translating chapter ({}{})",
            context.description(),
            if analysis_degraded { ", default context" } else { "" }
        );
        let started = Instant::now();
        let target_text = self
            .translation_pass
            .translate(self.provider, source_text, style_hint, &context, chapter_title_hint)
            .await
            .map_err(|source| TranslationError::Pipeline {
                stage: PipelineStage::Translate,
                source,
            })?;
        timings.translation = started.elapsed();

        info!(
            "Pipeline complete: analysis {:.2}s, translation {:.2}s",
            timings.analysis.as_secs_f32(),
            timings.translation.as_secs_f32()
        );

        Ok(PipelineOutput {
            target_text,
            notes: Vec::new(),
            extracted_context: context,
            analysis_degraded,
        })
    }

    /// Run only the analysis pass; a failed request aborts at the Analyze stage.
    pub async fn analyze(
        &self,
        source_text: &str,
        chapter_title_hint: Option<&str>,
    ) -> Result<AnalysisOutcome, TranslationError> {
        self.analysis_pass
            .analyze(self.provider, source_text, chapter_title_hint)
            .await
            .map_err(|source| TranslationError::Pipeline {
                stage: PipelineStage::Analyze,
                source,
            })
    }
}
