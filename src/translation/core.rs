/*!
 * Core translation service implementation.
 *
 * This module contains the main TranslationService struct, which wraps a
 * provider call (or the two-pass pipeline) in glossary substitution:
 * map terms to marker tokens, translate, restore the target terms, then
 * scan for tokens the provider failed to preserve.
 */

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::app_config::Config;
use crate::errors::{ProviderError, TranslationError};
use crate::providers::{Provider, ProviderClient};
use crate::translation::formatting::OutputCleaner;
use crate::translation::glossary::{GlossaryMap, MappedText, find_residual_markers, map_terms};
use crate::translation::model::{ExtractedContext, TranslationRequest};
use crate::translation::pipeline::TranslationPipeline;

/// Translation options shared by every chapter of a run
#[derive(Debug, Clone, Default)]
pub struct TranslationOptions {
    /// Style guidance passed to the provider
    pub style_hint: String,

    /// Ask for translator notes (single-pass only)
    pub want_notes: bool,
}

/// Outcome of translating one chapter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterTranslation {
    /// Translated text with glossary terms restored
    pub target_text: String,

    /// Translator notes, in provider order
    pub notes: Vec<String>,

    /// Marker tokens still present after restoration
    pub residual_markers: Vec<String>,

    /// Context from the analysis pass (two-pass only)
    pub extracted_context: Option<ExtractedContext>,

    /// Whether the analysis pass fell back to a default context
    pub analysis_degraded: bool,

    /// Number of glossary substitutions made in the source
    pub substitutions: usize,
}

impl ChapterTranslation {
    /// Whether every marker token was restored.
    pub fn is_clean(&self) -> bool {
        self.residual_markers.is_empty()
    }
}

/// Main translation service for chapter translation
pub struct TranslationService {
    /// Provider implementation
    provider: Box<dyn Provider>,

    /// Source language code
    pub source_language: String,

    /// Target language code
    pub target_language: String,

    /// Translation options
    pub options: TranslationOptions,
}

impl TranslationService {
    /// Create a new translation service from the application configuration
    pub fn new(config: &Config) -> Self {
        let provider = ProviderClient::from_config(&config.translation);
        let options = TranslationOptions {
            style_hint: config.translation.common.style_hint.clone(),
            want_notes: config.translation.common.want_notes,
        };

        Self::with_provider(Box::new(provider), &config.source_language, &config.target_language)
            .with_options(options)
    }

    /// Create a service around an explicit provider
    pub fn with_provider(provider: Box<dyn Provider>, source_language: &str, target_language: &str) -> Self {
        Self {
            provider,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            options: TranslationOptions::default(),
        }
    }

    /// Replace the translation options
    pub fn with_options(mut self, options: TranslationOptions) -> Self {
        self.options = options;
        self
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Whether the provider can run the two-pass pipeline
    pub fn supports_pipeline(&self) -> bool {
        self.provider.as_chat().is_some()
    }

    /// Translate a chapter with a single provider call.
    ///
    /// Terms are pinned by marker tokens, so the glossary itself is not
    /// repeated to the provider as hints.
    pub async fn translate_text(
        &self,
        text: &str,
        glossary: &GlossaryMap,
    ) -> Result<ChapterTranslation, TranslationError> {
        let text = OutputCleaner::normalize_line_endings(text);
        if text.trim().is_empty() {
            return Ok(ChapterTranslation::default());
        }

        let mapped = map_terms(&text, glossary);
        debug!(
            "Mapped {} glossary substitutions across {} terms",
            mapped.substitution_count(),
            mapped.markers.len()
        );

        let request = TranslationRequest::new(
            mapped.text.as_str(),
            self.source_language.as_str(),
            self.target_language.as_str(),
        )
        .style_hint(self.options.style_hint.as_str())
        .want_notes(self.options.want_notes);

        let start_time = Instant::now();
        let result = self.provider.translate(&request).await?;
        info!(
            "Translated {} chars with {} in {:.2}s",
            text.chars().count(),
            self.provider.name(),
            start_time.elapsed().as_secs_f32()
        );

        let target_text = mapped.restore(&result.target_text);
        let residual_markers = Self::check_residual(&target_text, &text);

        Ok(ChapterTranslation {
            target_text,
            notes: result.notes,
            residual_markers,
            extracted_context: None,
            analysis_degraded: false,
            substitutions: mapped.substitution_count(),
        })
    }

    /// Translate a chapter with the two-pass analyze-then-translate pipeline.
    ///
    /// Requires a chat-capable provider.
    pub async fn translate_with_pipeline(
        &self,
        text: &str,
        glossary: &GlossaryMap,
        chapter_title_hint: Option<&str>,
    ) -> Result<ChapterTranslation, TranslationError> {
        let chat = self.provider.as_chat().ok_or_else(|| {
            ProviderError::configuration(
                self.provider.name(),
                "two-pass translation needs a chat model (openai or anthropic)",
            )
        })?;

        let text = OutputCleaner::normalize_line_endings(text);
        if text.trim().is_empty() {
            return Ok(ChapterTranslation::default());
        }

        let mapped = map_terms(&text, glossary);
        let pipeline = TranslationPipeline::for_languages(chat, &self.source_language, &self.target_language);
        let output = pipeline
            .run(&mapped.text, &self.options.style_hint, chapter_title_hint)
            .await?;

        let target_text = mapped.restore(&output.target_text);
        let residual_markers = Self::check_residual(&target_text, &text);

        Ok(ChapterTranslation {
            target_text,
            notes: output.notes,
            residual_markers,
            extracted_context: Some(Self::restore_context(&mapped, output.extracted_context)),
            analysis_degraded: output.analysis_degraded,
            substitutions: mapped.substitution_count(),
        })
    }

    /// The analysis saw mapped text, so its names may hold marker tokens too.
    ///
    /// Fields quoting the source get the source terms back; rendered names
    /// get the glossary targets.
    fn restore_context(mapped: &MappedText, mut context: ExtractedContext) -> ExtractedContext {
        context.chapter_title = context.chapter_title.map(|t| mapped.restore_sources(&t));
        context.work_title = mapped.restore(&context.work_title);
        for character in &mut context.characters {
            character.source_name = mapped.restore_sources(&character.source_name);
            character.target_name = mapped.restore(&character.target_name);
        }
        for term in &mut context.terminology {
            term.term = mapped.restore_sources(&term.term);
            term.meaning = mapped.restore(&term.meaning);
        }
        context
    }

    /// Report marker tokens that survived restoration; never an error.
    ///
    /// Marker-shaped text already present in the source is not a leak.
    fn check_residual(text: &str, source: &str) -> Vec<String> {
        let residual: Vec<String> = find_residual_markers(text)
            .into_iter()
            .filter(|token| !source.contains(token.as_str()))
            .collect();
        if !residual.is_empty() {
            warn!(
                "{} marker token(s) were not preserved by the provider and remain in the output: {}",
                residual.len(),
                residual.join(", ")
            );
        }
        residual
    }
}
