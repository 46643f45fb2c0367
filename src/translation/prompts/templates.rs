/*!
 * Prompt templates for chapter translation.
 *
 * Three prompts are used:
 * - single-pass chapter translation (optionally asking for translator notes)
 * - chapter analysis producing an `ExtractedContext` as JSON
 * - grounded translation that feeds the extracted context back to the model
 */

use serde::{Deserialize, Serialize};

use crate::translation::glossary::{GlossaryMap, MARKER_CLOSE, MARKER_OPEN};
use crate::translation::model::ExtractedContext;

/// System prompt template with language placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for fiction chapter translation.
    pub const CHAPTER_TRANSLATOR: &'static str = r#"You are an expert literary translator specializing in {source_language} to {target_language} translation of serialized fiction.

## Your Role
- Translate the chapter faithfully while keeping the narrative voice
- Keep character names and terminology consistent with the guidance given
- Preserve paragraph breaks and dialogue punctuation conventions of {target_language}

## Placeholders
- Tokens such as «0», «1», «12» stand for proper nouns that are handled separately
- Copy every such token into your translation exactly as written, unchanged and untranslated
- Treat a token grammatically as the name it stands for

## Output Requirements
- Natural, idiomatic {target_language}
- No explanations, no commentary, no preamble"#;

    /// System prompt for the analysis request.
    pub const CHAPTER_ANALYST: &'static str = r#"You are a literary analyst preparing a {source_language} fiction chapter for translation into {target_language}.

Read the chapter and report, as a single JSON object and nothing else:
{
  "chapterTitle": "title line of the chapter exactly as written in the source, or null",
  "workTitle": "title of the novel if it can be inferred, otherwise \"unknown\"",
  "characters": [
    {
      "sourceName": "name as written in the source",
      "targetName": "recommended {target_language} rendering",
      "gender": "male | female | unknown",
      "description": "one short phrase about the character",
      "nameKind": "personal | title | nickname | other"
    }
  ],
  "terminology": [
    { "term": "source term", "meaning": "meaning or recommended rendering" }
  ],
  "recurringThemes": ["short theme or tone cue"]
}

Tokens such as «0» are placeholders for names that are already handled; do not list them."#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default chapter translator template.
    pub fn chapter_translator() -> Self {
        Self::new(Self::CHAPTER_TRANSLATOR)
    }

    /// Create the analysis template.
    pub fn chapter_analyst() -> Self {
        Self::new(Self::CHAPTER_ANALYST)
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::chapter_translator()
    }
}

/// Builder for translation prompts.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    source_language: String,
    target_language: String,
    text: String,
    style_hint: Option<String>,
    glossary: Option<GlossaryMap>,
    context: Option<ExtractedContext>,
    omit_title: Option<String>,
    want_notes: bool,
}

impl TranslationPromptBuilder {
    /// Create a new prompt builder; languages are display names.
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            text: String::new(),
            style_hint: None,
            glossary: None,
            context: None,
            omit_title: None,
            want_notes: false,
        }
    }

    /// Set the chapter text.
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Set the style hint; blank hints are ignored.
    pub fn with_style_hint(mut self, style_hint: &str) -> Self {
        let hint = style_hint.trim();
        self.style_hint = (!hint.is_empty()).then(|| hint.to_string());
        self
    }

    /// Set the glossary for terminology consistency.
    pub fn with_glossary(mut self, glossary: &GlossaryMap) -> Self {
        self.glossary = (!glossary.is_empty()).then(|| glossary.clone());
        self
    }

    /// Ground the translation in extracted context.
    pub fn with_context(mut self, context: &ExtractedContext) -> Self {
        self.context = Some(context.clone());
        self
    }

    /// Ask the model to leave a detected title line out of its output.
    pub fn omit_title(mut self, title: Option<&str>) -> Self {
        self.omit_title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self
    }

    /// Ask for translator notes in a JSON envelope.
    pub fn with_notes(mut self, want_notes: bool) -> Self {
        self.want_notes = want_notes;
        self
    }

    /// Build the system prompt.
    pub fn build_system_prompt(&self) -> String {
        let mut prompt = PromptTemplate::chapter_translator()
            .render(&self.source_language, &self.target_language);

        if self.want_notes {
            prompt.push_str(
                "\n\n## Notes\nReturn ONLY a JSON object of the form \
                 {\"translation\": \"<full translated chapter>\", \"notes\": [\"<short translator note>\", ...]}. \
                 Use notes for puns, cultural references or ambiguous terms; an empty list is fine.",
            );
        }

        prompt
    }

    /// Build the user prompt.
    pub fn build_user_prompt(&self) -> String {
        let mut sections = Vec::new();

        if let Some(ref style) = self.style_hint {
            sections.push(format!("## Style\n{}", style));
        }

        if let Some(ref context) = self.context {
            sections.push(render_context(context));
        }

        if let Some(ref glossary) = self.glossary {
            let lines: Vec<String> = glossary
                .iter()
                .map(|e| format!("- {} → {}", e.source, e.target))
                .collect();
            sections.push(format!(
                "## Glossary\nAlways render these terms as shown:\n{}",
                lines.join("\n")
            ));
        }

        if let Some(ref title) = self.omit_title {
            sections.push(format!(
                "## Chapter title\nThe chapter begins with its title line \"{}\". Do not include the title in your translation; translate the body only.",
                title
            ));
        }

        sections.push(format!(
            "## Chapter\nTranslate the following text from {} to {}. Keep every {}N{} token unchanged.\n\n{}",
            self.source_language, self.target_language, MARKER_OPEN, MARKER_CLOSE, self.text
        ));

        sections.join("\n\n")
    }

    /// Build both system and user prompts.
    pub fn build(&self) -> (String, String) {
        (self.build_system_prompt(), self.build_user_prompt())
    }
}

fn render_context(context: &ExtractedContext) -> String {
    let mut out = String::from("## Context");

    if context.work_title != ExtractedContext::UNKNOWN_WORK && !context.work_title.is_empty() {
        out.push_str(&format!("\nWork: {}", context.work_title));
    }

    if !context.characters.is_empty() {
        out.push_str("\nCharacters (use these renderings consistently):");
        for c in &context.characters {
            let target = if c.target_name.is_empty() {
                c.source_name.as_str()
            } else {
                c.target_name.as_str()
            };
            let gender: String = c.gender.into();
            let kind: String = c.name_kind.into();
            out.push_str(&format!("\n- {} → {} ({}, {})", c.source_name, target, gender, kind));
            if !c.description.is_empty() {
                out.push_str(&format!(": {}", c.description));
            }
        }
    }

    if !context.terminology.is_empty() {
        out.push_str("\nTerminology:");
        for t in &context.terminology {
            out.push_str(&format!("\n- {}: {}", t.term, t.meaning));
        }
    }

    if !context.recurring_themes.is_empty() {
        out.push_str(&format!("\nThemes and tone: {}", context.recurring_themes.join("; ")));
    }

    out
}

/// Builder for the analysis request.
#[derive(Debug, Clone)]
pub struct AnalysisPromptBuilder {
    source_language: String,
    target_language: String,
    text: String,
    chapter_title_hint: Option<String>,
}

impl AnalysisPromptBuilder {
    /// Create a new analysis prompt builder; languages are display names.
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            text: String::new(),
            chapter_title_hint: None,
        }
    }

    /// Set the chapter text.
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Pass along a title supplied by the caller.
    pub fn with_chapter_title_hint(mut self, hint: Option<&str>) -> Self {
        self.chapter_title_hint = hint
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self
    }

    /// Build both system and user prompts.
    pub fn build(&self) -> (String, String) {
        let system = PromptTemplate::chapter_analyst()
            .render(&self.source_language, &self.target_language);

        let mut user = String::new();
        if let Some(ref hint) = self.chapter_title_hint {
            user.push_str(&format!("The chapter is titled \"{}\".\n\n", hint));
        }
        user.push_str("Chapter:\n\n");
        user.push_str(&self.text);

        (system, user)
    }
}

/// JSON envelope expected when notes are requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotedTranslation {
    /// Translated chapter
    pub translation: String,

    /// Translator notes
    #[serde(default)]
    pub notes: Vec<String>,
}
