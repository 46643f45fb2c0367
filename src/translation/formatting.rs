/*!
 * Cleanup of free-text model output.
 *
 * Chat models wrap answers in code fences, prepend chatter, or repeat the
 * chapter heading even when told not to. These helpers recover the useful
 * part of a response.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Fenced block, optionally tagged with a language
static CODE_FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*\s*\n(.*?)\n?```\s*$").unwrap());

/// Helpers for normalizing provider output
pub struct OutputCleaner;

impl OutputCleaner {
    /// Extract a JSON object from a potentially wrapped response.
    pub fn extract_json(response: &str) -> Option<String> {
        let trimmed = response.trim();

        // If it starts with {, try to parse as-is
        if trimmed.starts_with('{') && trimmed.ends_with('}') {
            return Some(trimmed.to_string());
        }

        // Look for JSON block in markdown code fence
        if let Some(start) = trimmed.find("```json") {
            if let Some(end) = trimmed[start + 7..].find("```") {
                let json = trimmed[start + 7..start + 7 + end].trim();
                return Some(json.to_string());
            }
        }

        // Look for JSON block without language specifier
        if let Some(start) = trimmed.find("```") {
            if let Some(end) = trimmed[start + 3..].find("```") {
                let json = trimmed[start + 3..start + 3 + end].trim();
                if json.starts_with('{') {
                    return Some(json.to_string());
                }
            }
        }

        // Look for first { and last }
        if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
            if end > start {
                return Some(trimmed[start..=end].to_string());
            }
        }

        None
    }

    /// Remove a single surrounding code fence from a plain-text answer.
    pub fn strip_code_fence(text: &str) -> String {
        let trimmed = text.trim();
        match CODE_FENCE_REGEX.captures(trimmed) {
            Some(caps) => caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
            None => trimmed.to_string(),
        }
    }

    /// Drop the first non-empty line when it repeats the chapter title.
    ///
    /// Comparison ignores surrounding whitespace and markdown heading marks.
    pub fn strip_title_line(text: &str, title: &str) -> String {
        let wanted = Self::heading_text(title);
        if wanted.is_empty() {
            return text.to_string();
        }

        let mut lines = text.lines().skip_while(|l| l.trim().is_empty()).peekable();
        match lines.peek() {
            Some(first) if Self::heading_text(first) == wanted => {
                lines.next();
                let rest: Vec<&str> = lines.skip_while(|l| l.trim().is_empty()).collect();
                rest.join("\n")
            }
            _ => text.to_string(),
        }
    }

    /// Normalize CRLF line endings to LF.
    pub fn normalize_line_endings(text: &str) -> String {
        text.replace("\r\n", "\n")
    }

    fn heading_text(line: &str) -> String {
        line.trim().trim_start_matches('#').trim().to_string()
    }
}
