/*!
 * Two-pass chapter translation pipeline.
 *
 * The pipeline processes a chapter in two sequential requests:
 * 1. **Analysis Pass**: extract characters, terminology, themes and the chapter title
 * 2. **Translation Pass**: translate the body grounded in that context
 */

pub mod analysis_pass;
pub mod orchestrator;
pub mod translation_pass;

// Re-export types used externally
pub use analysis_pass::{AnalysisOutcome, AnalysisPass};
pub use orchestrator::{PipelineConfig, PipelineOutput, TranslationPipeline};
pub use translation_pass::TranslationPass;
