// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use chapterwai::app_config::{self, Config, TranslationProvider};
use chapterwai::app_controller::{Controller, FileOutcome, RunOptions};
use chapterwai::file_utils::FileManager;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    #[value(name = "huggingface", alias = "hf")]
    HuggingFace,
    #[value(name = "libretranslate", alias = "libre")]
    LibreTranslate,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::HuggingFace => TranslationProvider::HuggingFace,
            CliTranslationProvider::LibreTranslate => TranslationProvider::LibreTranslate,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a chapter file or a folder of chapters
    Translate(TranslateArgs),

    /// Generate shell completions for chapterwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Chapter file (.txt, .md) or directory of chapters
    #[arg(value_name = "PATH")]
    input_path: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'zh', 'ja', 'ko')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Glossary file: JSON object or `source = target` lines
    #[arg(short, long, value_name = "FILE")]
    glossary: Option<PathBuf>,

    /// Free-form style guidance for the translator
    #[arg(long)]
    style: Option<String>,

    /// Ask for translator notes (single-pass only)
    #[arg(long)]
    notes: bool,

    /// Analyze the chapter first, then translate grounded in the result
    #[arg(long)]
    two_pass: bool,

    /// Chapter title, if known (single chapter only; ignored for folders)
    #[arg(long)]
    title: Option<String>,

    /// Write the extracted context as JSON next to the translation
    #[arg(long, requires = "two_pass")]
    save_context: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// chapterwai - glossary-aware chapter translation with AI
#[derive(Parser, Debug)]
#[command(name = "chapterwai")]
#[command(version)]
#[command(about = "Glossary-aware translation of serialized fiction chapters")]
#[command(long_about = "chapterwai translates web-novel chapters with AI providers, pinning
glossary terms (names, places, techniques) so every chapter renders them the same way.

EXAMPLES:
    chapterwai translate ch001.txt                          # Translate using default config
    chapterwai translate -f ch001.txt                       # Force overwrite existing output
    chapterwai translate -g names.json chapters/            # Translate a folder with a glossary
    chapterwai translate -p anthropic --two-pass ch001.txt  # Analyze first, then translate
    chapterwai translate -s ja -t en --notes ch001.md       # Japanese to English with notes
    chapterwai completions bash > chapterwai.bash           # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. API keys may also come from OPENAI_API_KEY,
    ANTHROPIC_API_KEY, HF_API_TOKEN or LIBRETRANSLATE_API_KEY.

SUPPORTED PROVIDERS:
    openai         - OpenAI chat completions (two-pass capable)
    anthropic      - Anthropic messages API (two-pass capable)
    huggingface    - Hugging Face inference API (single-pass)
    libretranslate - LibreTranslate server (single-pass)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Label and color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "\x1B[1;31m"),
            Level::Warn => ("WARN ", "\x1B[1;33m"),
            Level::Info => ("INFO ", "\x1B[1;32m"),
            Level::Debug => ("DEBUG", "\x1B[1;36m"),
            Level::Trace => ("TRACE", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (label, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The real level is applied once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "chapterwai", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config)?;
    apply_overrides(&mut config, &options);

    config.validate()
        .context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let glossary = match &options.glossary {
        Some(path) => {
            let glossary = FileManager::load_glossary(path)?;
            info!("Loaded {} glossary terms from {}", glossary.len(), path.display());
            glossary
        }
        None => Default::default(),
    };

    let run_options = RunOptions {
        two_pass: options.two_pass,
        chapter_title: options.title.clone(),
        save_context: options.save_context,
        force_overwrite: options.force,
    };

    let controller = Controller::with_config(config)?
        .with_glossary(glossary)
        .with_options(run_options);

    if options.input_path.is_file() {
        if let FileOutcome::Skipped(path) = controller.run(options.input_path.clone()).await? {
            info!("Nothing to do, {} already exists", path.display());
        }
    } else if options.input_path.is_dir() {
        let summary = controller.run_folder(options.input_path.clone()).await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} chapter(s) failed to translate", summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

/// Command line values win over the configuration file
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        let active = config.translation.provider;
        config.translation.provider_config_mut(active).model = model.clone();
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(style) = &options.style {
        config.translation.common.style_hint = style.clone();
    }

    if options.notes {
        config.translation.common.want_notes = true;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}
