use anyhow::{Result, Context, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::translation::{ChapterTranslation, GlossaryMap, TranslationService};

// @module: Application controller for chapter processing

/// Per-run switches coming from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Use the two-pass analyze-then-translate pipeline
    pub two_pass: bool,

    /// Chapter title known to the caller; single-file runs only
    pub chapter_title: Option<String>,

    /// Write the extracted context next to the translation
    pub save_context: bool,

    /// Overwrite existing translations
    pub force_overwrite: bool,
}

/// What happened to one chapter file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Translation written to this path
    Translated(PathBuf),

    /// Translation already existed at this path
    Skipped(PathBuf),
}

/// Counts from a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FolderSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for chapter translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    service: TranslationService,
    glossary: GlossaryMap,
    options: RunOptions,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let service = TranslationService::new(&config);
        Ok(Self::with_service(config, service))
    }

    /// Create a controller around an existing translation service
    pub fn with_service(config: Config, service: TranslationService) -> Self {
        if language_utils::language_codes_match(&config.source_language, &config.target_language) {
            warn!(
                "Source and target language are both '{}', the provider will be asked to translate into the same language",
                config.target_language
            );
        }

        Self {
            config,
            service,
            glossary: GlossaryMap::new(),
            options: RunOptions::default(),
        }
    }

    /// Use this glossary for every chapter
    pub fn with_glossary(mut self, glossary: GlossaryMap) -> Self {
        self.glossary = glossary;
        self
    }

    /// Apply command line switches
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_language.is_empty() && !self.config.target_language.is_empty()
    }

    /// Translate one chapter file; the output lands next to the input.
    pub async fn run(&self, input_file: PathBuf) -> Result<FileOutcome> {
        self.run_chapter(input_file, self.options.chapter_title.as_deref()).await
    }

    async fn run_chapter(&self, input_file: PathBuf, title_hint: Option<&str>) -> Result<FileOutcome> {
        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let target = &self.config.target_language;
        let output_path = FileManager::translation_path(&input_file, target);
        if FileManager::file_exists(&output_path) && !self.options.force_overwrite {
            warn!("Skipping {}, translation already exists (use -f to force overwrite)", output_path.display());
            return Ok(FileOutcome::Skipped(output_path));
        }

        let start_time = Instant::now();
        let source_text = FileManager::read_to_string(&input_file)?;

        info!(
            "chapterwai: {} - {} ({} -> {})",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model(),
            self.config.source_language,
            target
        );

        let spinner = Self::spinner(&format!("Translating {}", Self::display_name(&input_file)));
        let translation = self.translate_chapter(&source_text, title_hint).await;
        spinner.finish_and_clear();

        let translation = translation
            .with_context(|| format!("Failed to translate {}", input_file.display()))?;
        self.write_outputs(&input_file, &output_path, &translation)?;

        info!(
            "Success: {} ({})",
            output_path.display(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(FileOutcome::Translated(output_path))
    }

    /// Translate every chapter under a directory, one after another.
    ///
    /// A failing chapter is logged and counted; the run goes on.
    pub async fn run_folder(&self, input_dir: PathBuf) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let chapters = FileManager::find_chapters(&input_dir, &self.config.target_language)?;
        if chapters.is_empty() {
            return Err(anyhow!("No chapter files (.txt, .md) found in directory: {:?}", input_dir));
        }
        debug!("Found {} chapter files in {}", chapters.len(), input_dir.display());

        let folder_pb = ProgressBar::new(chapters.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chapters ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        if let Some(title) = &self.options.chapter_title {
            warn!("Ignoring chapter title '{}' for a folder run; each chapter is analyzed on its own", title);
        }

        let mut summary = FolderSummary::default();

        for chapter in &chapters {
            folder_pb.set_message(format!("Processing: {}", Self::display_name(chapter)));

            match self.run_chapter(chapter.clone(), None).await {
                Ok(FileOutcome::Translated(_)) => summary.translated += 1,
                Ok(FileOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", Self::display_name(chapter), e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed: {} translated, {} skipped, {} errors ({})",
            summary.translated,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    async fn translate_chapter(&self, source_text: &str, title_hint: Option<&str>) -> Result<ChapterTranslation> {
        let translation = if self.options.two_pass {
            self.service
                .translate_with_pipeline(source_text, &self.glossary, title_hint)
                .await?
        } else {
            self.service.translate_text(source_text, &self.glossary).await?
        };

        if translation.analysis_degraded {
            warn!("Analysis reply was unusable, chapter was translated with a default context");
        }

        Ok(translation)
    }

    fn write_outputs(&self, input_file: &Path, output_path: &Path, translation: &ChapterTranslation) -> Result<()> {
        let target = &self.config.target_language;

        FileManager::write_to_file(output_path, &translation.target_text)?;

        if !translation.notes.is_empty() {
            let notes_path = FileManager::notes_path(input_file, target);
            FileManager::write_to_file(&notes_path, &translation.notes.join("\n"))?;
            debug!("Wrote {} notes to {}", translation.notes.len(), notes_path.display());
        }

        if self.options.save_context {
            match &translation.extracted_context {
                Some(context) => {
                    let context_path = FileManager::context_path(input_file, target);
                    let json = serde_json::to_string_pretty(context)
                        .context("Failed to serialize extracted context")?;
                    FileManager::write_to_file(&context_path, &json)?;
                }
                None => debug!("No extracted context to save (single-pass run)"),
            }
        }

        Ok(())
    }

    fn spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    fn display_name(path: &Path) -> String {
        path.file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{:.1}s", duration.as_secs_f32())
        }
    }
}
