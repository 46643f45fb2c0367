use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::translation::glossary::GlossaryMap;

// @module: Chapter and glossary file utilities

/// Extensions treated as chapter files
pub const CHAPTER_EXTENSIONS: &[&str] = &["txt", "md"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Sibling path `<stem>.<target>.<extension>` for a chapter
    pub fn generate_output_path<P: AsRef<Path>>(
        input_file: P,
        target_language: &str,
        extension: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();
        let output_dir = input_file.parent().unwrap_or_else(|| Path::new(""));

        output_dir.join(format!("{}.{}.{}", stem, target_language, extension))
    }

    /// Output path for the translated chapter, keeping the input extension
    pub fn translation_path<P: AsRef<Path>>(input_file: P, target_language: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let extension = input_file
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "txt".to_string());
        Self::generate_output_path(input_file, target_language, &extension)
    }

    /// Output path for translator notes
    pub fn notes_path<P: AsRef<Path>>(input_file: P, target_language: &str) -> PathBuf {
        Self::generate_output_path(input_file, target_language, "notes.txt")
    }

    /// Output path for the extracted chapter context
    pub fn context_path<P: AsRef<Path>>(input_file: P, target_language: &str) -> PathBuf {
        Self::generate_output_path(input_file, target_language, "context.json")
    }

    /// Whether a file looks like something this tool wrote for `target_language`
    pub fn is_generated_output<P: AsRef<Path>>(path: P, target_language: &str) -> bool {
        let name = path
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let marker = format!(".{}.", target_language.to_lowercase());
        name.contains(&marker)
    }

    /// Find chapter files in a directory, sorted by path
    ///
    /// Files previously written for `target_language` are skipped so a second
    /// run over the same folder does not translate its own output.
    pub fn find_chapters<P: AsRef<Path>>(dir: P, target_language: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }
            let is_chapter = path
                .extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy();
                    CHAPTER_EXTENSIONS.iter().any(|c| ext.eq_ignore_ascii_case(c))
                })
                .unwrap_or(false);

            if is_chapter && !Self::is_generated_output(path, target_language) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load a glossary file
    ///
    /// `.json` files hold either a list of `{"source", "target"}` objects or a
    /// single object mapping source to target; anything else is read as
    /// `source = target` lines.
    pub fn load_glossary<P: AsRef<Path>>(path: P) -> Result<GlossaryMap> {
        let path = path.as_ref();
        let content = Self::read_to_string(path)?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_str::<GlossaryMap>(&content)
                .with_context(|| format!("Invalid glossary JSON: {:?}", path))
        } else {
            GlossaryMap::parse_lines(&content)
                .map_err(|e| anyhow!("Invalid glossary file {:?}: {}", path, e))
        }
    }
}
