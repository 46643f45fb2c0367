/*!
 * Translation pass: translate a chapter grounded in extracted context.
 *
 * The prompt carries the characters, terminology and themes found by the
 * analysis pass and asks the model to leave the chapter title out. Models
 * sometimes repeat the title anyway, so a leading line equal to it is
 * stripped from the reply.
 */

use crate::errors::ProviderError;
use crate::providers::ChatProvider;
use crate::translation::formatting::OutputCleaner;
use crate::translation::model::ExtractedContext;
use crate::translation::prompts::TranslationPromptBuilder;

/// Grounded translation over a chat provider.
#[derive(Debug, Clone)]
pub struct TranslationPass {
    source_language: String,
    target_language: String,
}

impl TranslationPass {
    /// Create a translation pass; languages are display names.
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        }
    }

    /// System and user prompts for one chapter.
    pub fn build_prompts(
        &self,
        source_text: &str,
        style_hint: &str,
        context: &ExtractedContext,
        chapter_title_hint: Option<&str>,
    ) -> (String, String) {
        TranslationPromptBuilder::new(&self.source_language, &self.target_language)
            .with_text(source_text)
            .with_style_hint(style_hint)
            .with_context(context)
            .omit_title(Self::title_to_omit(context, chapter_title_hint))
            .build()
    }

    /// Clean a raw reply: code fence and any repeated title line go.
    pub fn clean_reply(reply: &str, context: &ExtractedContext, chapter_title_hint: Option<&str>) -> String {
        let mut text = OutputCleaner::strip_code_fence(reply);
        for title in [context.chapter_title.as_deref(), chapter_title_hint].into_iter().flatten() {
            text = OutputCleaner::strip_title_line(&text, title);
        }
        text
    }

    /// Run the translation request.
    pub async fn translate(
        &self,
        provider: &dyn ChatProvider,
        source_text: &str,
        style_hint: &str,
        context: &ExtractedContext,
        chapter_title_hint: Option<&str>,
    ) -> Result<String, ProviderError> {
        let (system, user) = self.build_prompts(source_text, style_hint, context, chapter_title_hint);
        let reply = provider.chat(&system, &user).await?;

        if reply.trim().is_empty() {
            return Err(ProviderError::ParseError("Empty translation reply".to_string()));
        }

        Ok(Self::clean_reply(&reply, context, chapter_title_hint))
    }

    fn title_to_omit<'a>(context: &'a ExtractedContext, hint: Option<&'a str>) -> Option<&'a str> {
        context.chapter_title.as_deref().or(hint)
    }
}
