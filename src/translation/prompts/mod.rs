/*!
 * Prompt engineering for chapter translation.
 *
 * This module provides:
 * - System prompt templates for translation and analysis
 * - Prompt builders that fold style, glossary and extracted context in
 * - The JSON envelope used when translator notes are requested
 */

pub mod templates;

// Re-export main types
pub use templates::{AnalysisPromptBuilder, NotedTranslation, PromptTemplate, TranslationPromptBuilder};
