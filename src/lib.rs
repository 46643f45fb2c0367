/*!
 * # chapterwai - glossary-aware chapter translation with AI
 *
 * A Rust library for translating serialized fiction chapters with AI
 * providers while keeping named entities consistent across chapters.
 *
 * ## Features
 *
 * - Glossary substitution: source terms are swapped for opaque marker tokens
 *   before translation and the target terms are put back afterwards
 * - Translate chapters using various providers:
 *   - OpenAI API
 *   - Anthropic API
 *   - Hugging Face inference API
 *   - LibreTranslate
 * - Two-pass analyze-then-translate pipeline for chat models
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: Translation services:
 *   - `translation::glossary`: Glossary substitution engine
 *   - `translation::core`: Chapter translation service
 *   - `translation::pipeline`: Two-pass pipeline
 *   - `translation::prompts`: Prompt templates
 * - `file_utils`: Chapter and glossary file operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for the translation backends
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use translation::{ChapterTranslation, GlossaryMap, TranslationService, map_terms, restore_terms};
pub use language_utils::{language_codes_match, normalize_to_part2t, get_language_name};
pub use errors::{GlossaryError, ProviderError, TranslationError};
