/*!
 * Tests for file utility functions
 */

use std::path::Path;
use anyhow::Result;
use chapterwai::file_utils::FileManager;
use chapterwai::translation::map_terms;
use crate::common;

/// A JSON object glossary keeps the file's order, so a longer term listed first wins
#[test]
fn test_load_glossary_withJsonObject_shouldKeepFileOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "glossary.json",
        r#"{"青云门": "Azure Cloud Sect", "青云": "Azure Cloud"}"#,
    )?;

    let glossary = FileManager::load_glossary(&path)?;
    let sources: Vec<&str> = glossary.iter().map(|e| e.source.as_str()).collect();
    assert_eq!(sources, vec!["青云门", "青云"]);

    let mapped = map_terms("青云门弟子", &glossary);
    assert_eq!(mapped.restore(&mapped.text), "Azure Cloud Sect弟子");

    Ok(())
}

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "ch01.txt", "正文")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));

    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_chapter.txt"));
}

/// Output lands next to the input with the target language inserted
#[test]
fn test_generate_output_path_withValidInputs_shouldCreateSiblingPath() {
    let output_path = FileManager::generate_output_path(Path::new("/novels/book/ch12.md"), "fr", "md");

    assert_eq!(output_path, Path::new("/novels/book/ch12.fr.md"));
}

/// Writing creates missing parent directories
#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("vol1").join("ch01.en.txt");

    FileManager::write_to_file(&nested, "Chapter one")?;

    assert_eq!(FileManager::read_to_string(&nested)?, "Chapter one");
    Ok(())
}

/// Chapters are found recursively, sorted, and our own outputs are skipped
#[test]
fn test_find_chapters_withMixedFiles_shouldReturnSortedSourceChapters() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    std::fs::create_dir(dir.join("vol2"))?;

    common::create_test_file(dir, "ch02.txt", "二")?;
    common::create_test_file(dir, "ch01.md", "一")?;
    common::create_test_file(dir, "ch01.en.md", "one")?;
    common::create_test_file(dir, "cover.jpg", "")?;
    common::create_test_file(&dir.join("vol2"), "ch03.TXT", "三")?;

    let chapters = FileManager::find_chapters(dir, "en")?;
    let names: Vec<String> = chapters
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(names, vec!["ch01.md", "ch02.txt", "ch03.TXT"]);
    Ok(())
}

/// JSON object glossaries load
#[test]
fn test_load_glossary_withJsonObject_shouldLoadTerms() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "names.json",
        r#"{"张三": "Zhang San", "青云山": "Azure Cloud Mountain"}"#,
    )?;

    let glossary = FileManager::load_glossary(&path)?;

    assert_eq!(glossary.len(), 2);
    assert_eq!(glossary.get("青云山"), Some("Azure Cloud Mountain"));
    Ok(())
}

/// JSON list glossaries keep file order
#[test]
fn test_load_glossary_withJsonList_shouldKeepOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "names.json",
        r#"[{"source": "青云山", "target": "Azure Cloud Mountain"}, {"source": "青云", "target": "Azure Cloud"}]"#,
    )?;

    let glossary = FileManager::load_glossary(&path)?;
    let sources: Vec<&str> = glossary.iter().map(|e| e.source.as_str()).collect();

    assert_eq!(sources, vec!["青云山", "青云"]);
    Ok(())
}

/// Plain text glossaries use the line format
#[test]
fn test_load_glossary_withLineFormat_shouldLoadTerms() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "names.txt", "# cast\n张三 = Zhang San\n李四\tLi Si\n")?;

    let glossary = FileManager::load_glossary(&path)?;

    assert_eq!(glossary.get("张三"), Some("Zhang San"));
    assert_eq!(glossary.get("李四"), Some("Li Si"));
    Ok(())
}

/// Malformed glossary lines are reported
#[test]
fn test_load_glossary_withInvalidLine_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "names.txt", "张三 = Zhang San\njust some words\n")?;

    let result = FileManager::load_glossary(&path);

    assert!(result.is_err());
    Ok(())
}
