/*!
 * Analysis pass: infer chapter context before translating.
 *
 * The model is asked for an `ExtractedContext` as JSON:
 * - chapter title as written in the source
 * - character names with recommended renderings
 * - terminology and recurring themes
 *
 * A reply that cannot be parsed does not abort the pipeline; it yields
 * `AnalysisOutcome::Degraded` carrying a minimal fallback context.
 */

use log::{debug, warn};

use crate::errors::ProviderError;
use crate::providers::ChatProvider;
use crate::translation::formatting::OutputCleaner;
use crate::translation::model::ExtractedContext;
use crate::translation::prompts::AnalysisPromptBuilder;

/// Result of the analysis pass.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The model returned a usable context
    Structured(ExtractedContext),

    /// The reply was not valid structured data; `context` is the fallback
    Degraded {
        context: ExtractedContext,
        reason: String,
    },
}

impl AnalysisOutcome {
    /// The context to ground translation in, whichever branch was taken.
    pub fn context(&self) -> &ExtractedContext {
        match self {
            Self::Structured(context) => context,
            Self::Degraded { context, .. } => context,
        }
    }

    /// Take ownership of the context.
    pub fn into_context(self) -> ExtractedContext {
        match self {
            Self::Structured(context) => context,
            Self::Degraded { context, .. } => context,
        }
    }

    /// Whether the fallback context is in use.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Analysis pass over a chat provider.
#[derive(Debug, Clone)]
pub struct AnalysisPass {
    /// Source language display name
    source_language: String,
    /// Target language display name
    target_language: String,
}

impl AnalysisPass {
    /// Create an analysis pass; languages are display names.
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        }
    }

    /// System and user prompts for one chapter.
    pub fn build_prompts(&self, source_text: &str, chapter_title_hint: Option<&str>) -> (String, String) {
        AnalysisPromptBuilder::new(&self.source_language, &self.target_language)
            .with_text(source_text)
            .with_chapter_title_hint(chapter_title_hint)
            .build()
    }

    /// Interpret a raw analysis reply.
    pub fn parse_response(reply: &str, chapter_title_hint: Option<&str>) -> AnalysisOutcome {
        let degraded = |reason: String| AnalysisOutcome::Degraded {
            context: ExtractedContext::fallback(chapter_title_hint),
            reason,
        };

        let Some(json) = OutputCleaner::extract_json(reply) else {
            return degraded("no JSON object in analysis reply".to_string());
        };

        match serde_json::from_str::<ExtractedContext>(&json) {
            Ok(mut context) => {
                if context.work_title.trim().is_empty() {
                    context.work_title = ExtractedContext::UNKNOWN_WORK.to_string();
                }
                context.chapter_title = context
                    .chapter_title
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .or_else(|| {
                        chapter_title_hint
                            .map(str::trim)
                            .filter(|t| !t.is_empty())
                            .map(str::to_string)
                    });
                AnalysisOutcome::Structured(context)
            }
            Err(e) => degraded(format!("invalid analysis JSON: {}", e)),
        }
    }

    /// Run the analysis request.
    ///
    /// Provider failures are returned; parse failures are not.
    pub async fn analyze(
        &self,
        provider: &dyn ChatProvider,
        source_text: &str,
        chapter_title_hint: Option<&str>,
    ) -> Result<AnalysisOutcome, ProviderError> {
        let (system, user) = self.build_prompts(source_text, chapter_title_hint);
        let reply = provider.chat(&system, &user).await?;

        let outcome = Self::parse_response(&reply, chapter_title_hint);
        match &outcome {
            AnalysisOutcome::Structured(context) => {
                debug!("Analysis extracted {}", context.description());
            }
            AnalysisOutcome::Degraded { reason, .. } => {
                warn!("Analysis reply unusable ({}); continuing with default context", reason);
            }
        }

        Ok(outcome)
    }
}
