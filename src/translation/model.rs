/*!
 * Request, result and context types shared by providers and the pipeline.
 */

use serde::{Deserialize, Serialize};

use crate::translation::glossary::GlossaryMap;

/// Immutable input to a provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    /// Text to translate (usually already glossary-mapped)
    pub text: String,

    /// Free-form style guidance ("literary", "keep honorifics", ...)
    pub style_hint: String,

    /// Glossary hints for providers that can use them
    pub glossary: GlossaryMap,

    /// Whether translator notes are wanted alongside the text
    pub want_notes: bool,

    /// Source language code
    pub source_language: String,

    /// Target language code
    pub target_language: String,
}

impl TranslationRequest {
    /// Create a request with an empty glossary and no style hint.
    pub fn new(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            style_hint: String::new(),
            glossary: GlossaryMap::new(),
            want_notes: false,
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }

    /// Set the style hint
    pub fn style_hint(mut self, style_hint: impl Into<String>) -> Self {
        self.style_hint = style_hint.into();
        self
    }

    /// Attach glossary hints
    pub fn glossary(mut self, glossary: GlossaryMap) -> Self {
        self.glossary = glossary;
        self
    }

    /// Ask for translator notes
    pub fn want_notes(mut self, want_notes: bool) -> Self {
        self.want_notes = want_notes;
        self
    }
}

/// Output of a provider call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Translated text
    pub target_text: String,

    /// Translator notes, in provider order; may be empty
    #[serde(default)]
    pub notes: Vec<String>,
}

impl TranslationResult {
    /// Result with text only.
    pub fn text(target_text: impl Into<String>) -> Self {
        Self {
            target_text: target_text.into(),
            notes: Vec::new(),
        }
    }
}

/// Grammatical gender reported for a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "male" | "m" | "man" => Self::Male,
            "female" | "f" | "woman" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
        .to_string()
    }
}

/// What kind of name a character entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NameKind {
    /// Personal or given name
    #[default]
    Personal,
    /// Courtesy name, title or honorific form
    Title,
    /// Nickname or epithet
    Nickname,
    /// Anything the model could not classify
    Other,
}

impl From<String> for NameKind {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "personal" | "name" | "given" | "full" => Self::Personal,
            "title" | "honorific" | "courtesy" => Self::Title,
            "nickname" | "epithet" | "alias" => Self::Nickname,
            _ => Self::Other,
        }
    }
}

impl From<NameKind> for String {
    fn from(kind: NameKind) -> Self {
        match kind {
            NameKind::Personal => "personal",
            NameKind::Title => "title",
            NameKind::Nickname => "nickname",
            NameKind::Other => "other",
        }
        .to_string()
    }
}

/// A character detected during analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    pub source_name: String,

    #[serde(default)]
    pub target_name: String,

    #[serde(default)]
    pub gender: Gender,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub name_kind: NameKind,
}

/// A term and its meaning as explained by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub term: String,

    #[serde(default)]
    pub meaning: String,
}

/// Context inferred from a chapter by the Analyze step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContext {
    /// Chapter title line detected in the source, if any
    #[serde(default)]
    pub chapter_title: Option<String>,

    /// Title of the work the chapter belongs to
    #[serde(default)]
    pub work_title: String,

    #[serde(default)]
    pub characters: Vec<CharacterProfile>,

    #[serde(default)]
    pub terminology: Vec<TermEntry>,

    #[serde(default)]
    pub recurring_themes: Vec<String>,
}

impl ExtractedContext {
    /// Work title used when nothing better is known
    pub const UNKNOWN_WORK: &'static str = "unknown";

    /// Minimal context used when analysis output cannot be parsed.
    pub fn fallback(chapter_title_hint: Option<&str>) -> Self {
        let hint = chapter_title_hint
            .map(str::trim)
            .filter(|t| !t.is_empty());

        Self {
            chapter_title: hint.map(str::to_string),
            work_title: hint.unwrap_or(Self::UNKNOWN_WORK).to_string(),
            characters: Vec::new(),
            terminology: Vec::new(),
            recurring_themes: Vec::new(),
        }
    }

    /// True when the context carries nothing to ground a translation in.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.terminology.is_empty() && self.recurring_themes.is_empty()
    }

    /// Short description for logging.
    pub fn description(&self) -> String {
        format!(
            "{} characters, {} terms, {} themes",
            self.characters.len(),
            self.terminology.len(),
            self.recurring_themes.len()
        )
    }
}
