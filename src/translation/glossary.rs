/*!
 * Glossary substitution for terminology consistency.
 *
 * Before text is sent to a provider, every glossary source term is replaced
 * by a placeholder token (`«0»`, `«1»`, ...). After translation the tokens are
 * swapped for the preferred target-language renderings, so names and key terms
 * come out the same way in every chapter regardless of what the model would
 * have chosen on its own.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::errors::GlossaryError;

/// Opening delimiter of a marker token
pub const MARKER_OPEN: char = '«';

/// Closing delimiter of a marker token
pub const MARKER_CLOSE: char = '»';

static RESIDUAL_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"«\d+»").unwrap());

/// A single source → target pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// Term as it appears in the source text
    pub source: String,

    /// Preferred rendering in the target language
    pub target: String,
}

/// User-maintained mapping from source terms to preferred renderings.
///
/// Entries keep the order in which they were added; that order drives
/// substitution. Re-inserting an existing source term replaces its target
/// without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGlossary", into = "Vec<GlossaryEntry>")]
pub struct GlossaryMap {
    entries: Vec<GlossaryEntry>,
}

/// Accepted on-disk shapes: a list of entries or a plain object.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawGlossary {
    List(Vec<GlossaryEntry>),
    Map(OrderedPairs),
}

/// JSON object read as pairs in file order.
struct OrderedPairs(Vec<(String, String)>);

impl<'de> Deserialize<'de> for OrderedPairs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = OrderedPairs;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of source term to target term")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((source, target)) = access.next_entry::<String, String>()? {
                    pairs.push((source, target));
                }
                Ok(OrderedPairs(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

impl TryFrom<RawGlossary> for GlossaryMap {
    type Error = GlossaryError;

    fn try_from(raw: RawGlossary) -> Result<Self, Self::Error> {
        match raw {
            RawGlossary::List(entries) => {
                Self::from_pairs(entries.into_iter().map(|e| (e.source, e.target)))
            }
            RawGlossary::Map(OrderedPairs(pairs)) => Self::from_pairs(pairs),
        }
    }
}

impl From<GlossaryMap> for Vec<GlossaryEntry> {
    fn from(glossary: GlossaryMap) -> Self {
        glossary.entries
    }
}

impl GlossaryMap {
    /// Create an empty glossary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a glossary from pairs, rejecting empty terms.
    pub fn from_pairs<I, S, T>(pairs: I) -> Result<Self, GlossaryError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut glossary = Self::new();
        for (source, target) in pairs {
            glossary.insert(source, target)?;
        }
        Ok(glossary)
    }

    /// Add or replace a term.
    pub fn insert(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<(), GlossaryError> {
        let source = source.into();
        let target = target.into();

        if source.trim().is_empty() {
            return Err(GlossaryError::EmptySourceTerm);
        }
        if target.trim().is_empty() {
            return Err(GlossaryError::EmptyTargetTerm { term: source });
        }

        match self.entries.iter_mut().find(|e| e.source == source) {
            Some(existing) => existing.target = target,
            None => self.entries.push(GlossaryEntry { source, target }),
        }
        Ok(())
    }

    /// Look up the preferred rendering of a source term.
    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.source == source)
            .map(|e| e.target.as_str())
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &GlossaryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse the line format: `source = target` or `source<TAB>target`.
    ///
    /// Blank lines and lines starting with `#` or `//` are skipped.
    pub fn parse_lines(content: &str) -> Result<Self, GlossaryError> {
        let mut glossary = Self::new();

        for (line_num, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }

            let (source, target) = split_line(line).ok_or_else(|| GlossaryError::InvalidLine {
                line: line_num + 1,
                content: line.to_string(),
            })?;
            glossary.insert(source, target)?;
        }

        Ok(glossary)
    }
}

fn split_line(line: &str) -> Option<(&str, &str)> {
    for sep in ['\t', '='] {
        if let Some((source, target)) = line.split_once(sep) {
            let source = source.trim();
            let target = target.trim();
            if !source.is_empty() && !target.is_empty() {
                return Some((source, target));
            }
        }
    }
    None
}

/// Placeholder record produced by one [`map_terms`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionMarker {
    /// Placeholder inserted into the text
    pub token: String,

    /// Term the placeholder replaced
    pub source_term: String,

    /// Rendering restored in place of the placeholder
    pub target_term: String,
}

/// Output of [`map_terms`]: the rewritten text and the markers it used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedText {
    /// Text with glossary terms replaced by tokens
    pub text: String,

    /// One marker per glossary entry, in glossary order
    pub markers: Vec<SubstitutionMarker>,
}

impl MappedText {
    /// Restore this mapping's markers into a provider's output.
    pub fn restore(&self, translated: &str) -> String {
        restore_terms(translated, &self.markers)
    }

    /// Put the original source terms back, for text still in the source language.
    pub fn restore_sources(&self, text: &str) -> String {
        restore_sources(text, &self.markers)
    }

    /// Number of markers that actually replaced something in the source.
    pub fn substitution_count(&self) -> usize {
        self.markers
            .iter()
            .filter(|m| self.text.contains(&m.token))
            .count()
    }
}

enum Segment {
    Text(String),
    Marker(usize),
}

/// Replace every glossary source term in `text` with a unique marker token.
///
/// Terms are applied in glossary order and matched as literal substrings.
/// Text already claimed by an earlier term is never rewritten by a later one.
/// A marker is recorded for every entry, including terms that do not occur.
pub fn map_terms(text: &str, glossary: &GlossaryMap) -> MappedText {
    let mut markers = Vec::with_capacity(glossary.len());
    let mut segments = vec![Segment::Text(text.to_string())];
    let mut next_index = 0usize;

    for entry in glossary.iter() {
        let token = allocate_token(text, &mut next_index);
        let marker_index = markers.len();
        markers.push(SubstitutionMarker {
            token,
            source_term: entry.source.clone(),
            target_term: entry.target.clone(),
        });

        // Terms are user text; escape so '.' or '(' only match themselves.
        let pattern = match Regex::new(&regex::escape(&entry.source)) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!("Skipping glossary term '{}': {}", entry.source, e);
                continue;
            }
        };

        segments = segments
            .into_iter()
            .flat_map(|segment| match segment {
                Segment::Text(chunk) => split_on_term(&chunk, &pattern, marker_index),
                marker => vec![marker],
            })
            .collect();
    }

    let mut mapped = String::with_capacity(text.len());
    for segment in &segments {
        match segment {
            Segment::Text(chunk) => mapped.push_str(chunk),
            Segment::Marker(index) => mapped.push_str(&markers[*index].token),
        }
    }

    MappedText {
        text: mapped,
        markers,
    }
}

fn split_on_term(chunk: &str, pattern: &Regex, marker_index: usize) -> Vec<Segment> {
    let mut parts = Vec::new();
    let mut last = 0;

    for found in pattern.find_iter(chunk) {
        if found.start() > last {
            parts.push(Segment::Text(chunk[last..found.start()].to_string()));
        }
        parts.push(Segment::Marker(marker_index));
        last = found.end();
    }

    if last < chunk.len() {
        parts.push(Segment::Text(chunk[last..].to_string()));
    }

    parts
}

/// Next `«N»` token that does not already occur in the source text.
fn allocate_token(source: &str, next_index: &mut usize) -> String {
    loop {
        let token = format!("{}{}{}", MARKER_OPEN, *next_index, MARKER_CLOSE);
        *next_index += 1;
        if !source.contains(&token) {
            return token;
        }
    }
}

/// Swap every marker token in `text` for its target term.
///
/// Markers whose token is absent are a no-op, so restoring twice is harmless.
pub fn restore_terms(text: &str, markers: &[SubstitutionMarker]) -> String {
    let mut restored = text.to_string();
    for marker in markers {
        if restored.contains(&marker.token) {
            restored = restored.replace(&marker.token, &marker.target_term);
        }
    }
    restored
}

/// Swap every marker token in `text` back to the source term it replaced.
pub fn restore_sources(text: &str, markers: &[SubstitutionMarker]) -> String {
    let mut restored = text.to_string();
    for marker in markers {
        if restored.contains(&marker.token) {
            restored = restored.replace(&marker.token, &marker.source_term);
        }
    }
    restored
}

/// Marker-shaped tokens still present in `text`, in order of appearance.
///
/// A non-empty result means the provider altered or dropped a token and the
/// literal placeholder leaked into the output.
pub fn find_residual_markers(text: &str) -> Vec<String> {
    RESIDUAL_MARKER
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
