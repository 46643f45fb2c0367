/*!
 * Tests for configuration loading and saving
 */

use anyhow::Result;
use chapterwai::app_config::{Config, LogLevel, TranslationProvider};
use crate::common;

/// A missing config file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.is_file());
    assert_eq!(config.source_language, "zh");
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    Ok(())
}

/// Saved settings survive a reload
#[test]
fn test_save_thenLoad_shouldKeepSettings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.source_language = "ko".to_string();
    config.translation.provider = TranslationProvider::HuggingFace;
    config.translation.provider_config_mut(TranslationProvider::HuggingFace).model =
        "Helsinki-NLP/opus-mt-ko-en".to_string();
    config.translation.common.style_hint = "keep honorifics".to_string();
    config.log_level = LogLevel::Debug;
    config.save(&path)?;

    let loaded = Config::load_or_create(&path)?;

    assert_eq!(loaded.source_language, "ko");
    assert_eq!(loaded.translation.provider, TranslationProvider::HuggingFace);
    assert_eq!(loaded.translation.get_model(), "Helsinki-NLP/opus-mt-ko-en");
    assert_eq!(loaded.translation.common.style_hint, "keep honorifics");
    assert_eq!(loaded.log_level, LogLevel::Debug);
    Ok(())
}

/// The on-disk provider list uses the lowercase `type` key
#[test]
fn test_save_shouldUseLowercaseProviderIdentifiers() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");
    Config::default().save(&path)?;

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    let types: Vec<&str> = json["translation"]["available_providers"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["type"].as_str())
        .collect();

    assert_eq!(json["translation"]["provider"], "openai");
    assert_eq!(types, vec!["openai", "anthropic", "huggingface", "libretranslate"]);
    Ok(())
}

/// Broken JSON is an error, not a silent reset to defaults
#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

/// Temperature outside 0..=2 is rejected
#[test]
fn test_validate_withTemperatureOutOfRange_shouldFail() {
    let mut config = Config::default();
    config.translation.common.temperature = 3.5;

    assert!(config.validate().is_err());
}

/// Chat capability follows the provider kind
#[test]
fn test_is_chat_model_shouldOnlyHoldForChatProviders() {
    assert!(TranslationProvider::OpenAI.is_chat_model());
    assert!(TranslationProvider::Anthropic.is_chat_model());
    assert!(!TranslationProvider::HuggingFace.is_chat_model());
    assert!(!TranslationProvider::LibreTranslate.is_chat_model());
}
