/*!
 * Chapter translation using AI providers.
 *
 * This module contains the core functionality for translating chapters.
 * It is split into several submodules:
 *
 * - `glossary`: Glossary substitution engine (marker tokens in, terms out)
 * - `model`: Request, result and extracted-context types
 * - `core`: Translation service wrapping providers in glossary substitution
 * - `pipeline`: Two-pass analyze-then-translate pipeline
 * - `formatting`: Cleanup of free-text model output
 * - `prompts`: Prompt templates and builders for translation
 */

// Re-export main types for easier usage
pub use self::core::{ChapterTranslation, TranslationOptions, TranslationService};
pub use self::glossary::{GlossaryMap, MappedText, SubstitutionMarker, map_terms, restore_sources, restore_terms};
pub use self::model::{ExtractedContext, TranslationRequest, TranslationResult};
pub use self::pipeline::{AnalysisOutcome, PipelineOutput, TranslationPipeline};

// Re-export prompt types
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};

// Submodules
pub mod core;
pub mod formatting;
pub mod glossary;
pub mod model;
pub mod pipeline;
pub mod prompts;
