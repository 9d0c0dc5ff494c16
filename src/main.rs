// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use scriptprep::app_config::{self, Config};
use scriptprep::file_utils::FileManager;
use scriptprep::providers::mock::{MockSynthesizer, MockTranslator};
use scriptprep::{AppError, MaskingSession, ScriptPipeline};

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

#[derive(Args, Debug)]
struct InputArgs {
    /// Script file or directory to process (stdin when omitted or `-`)
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert scripts into speakable plain text
    Clean {
        #[command(flatten)]
        input: InputArgs,

        /// Write `<name>.clean.txt` files here instead of printing
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print what was removed as JSON on stderr
        #[arg(short, long)]
        report: bool,
    },

    /// Estimate shot and word counts (JSON)
    Estimate {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Clean and estimate in one pass (JSON)
    Prepare {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Replace protected spans with placeholders (JSON with session)
    Mask {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Put protected spans back into translated text
    Restore {
        /// JSON written by `mask`, or a bare session
        #[arg(short, long)]
        session: PathBuf,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Run the full translate-and-speak path against mock engines (JSON)
    DryRun {
        #[command(flatten)]
        input: InputArgs,

        /// Voice name passed to the speech engine
        #[arg(long, default_value = "default")]
        voice: String,

        /// Upper-case the text outside placeholders to simulate a translation
        #[arg(short, long)]
        uppercase: bool,
    },

    /// Generate shell completions for scriptprep
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// scriptprep - video script preparation for translation and speech
#[derive(Parser, Debug)]
#[command(name = "scriptprep")]
#[command(version)]
#[command(about = "Prepare video scripts for translation and speech synthesis")]
#[command(long_about = "scriptprep protects directions and image prompts from translation, cleans scripts into speakable text and estimates their structure.

EXAMPLES:
    scriptprep clean script.md                          # Print speakable text
    scriptprep clean -o out/ scripts/                   # Clean a whole directory
    scriptprep estimate script.md                       # Shot and word counts
    scriptprep mask script.md > masked.json             # Mask before translation
    scriptprep restore -s masked.json translated.txt    # Restore after translation
    scriptprep dry-run -u script.md                     # Check placeholders survive a transform
    scriptprep completions bash > scriptprep.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
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
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let level = record.level();

            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logger accepts everything; the max level does the filtering
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "scriptprep", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level.clone()).to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }
    config
        .validate()
        .context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let pipeline = ScriptPipeline::from_config(&config);

    match cli.command {
        Commands::Clean {
            input,
            output_dir,
            report,
        } => run_clean(&pipeline, &input, output_dir.as_deref(), report),
        Commands::Estimate { input } => run_estimate(&pipeline, &config, &input),
        Commands::Prepare { input } => run_prepare(&pipeline, &input),
        Commands::Mask { input } => run_mask(&pipeline, &input),
        Commands::Restore { session, input } => run_restore(&pipeline, &session, &input),
        Commands::DryRun {
            input,
            voice,
            uppercase,
        } => run_dry_run(&pipeline, &input, &voice, uppercase).await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// A script read from disk or stdin
struct ScriptInput {
    path: Option<PathBuf>,
    text: String,
}

impl ScriptInput {
    fn label(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string())
    }
}

fn read_inputs(args: &InputArgs) -> Result<Vec<ScriptInput>> {
    let path = match &args.input_path {
        Some(path) if path.as_path() != Path::new("-") => path,
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            return Ok(vec![ScriptInput { path: None, text }]);
        }
    };

    if FileManager::file_exists(path) {
        return Ok(vec![ScriptInput {
            path: Some(path.clone()),
            text: FileManager::read_to_string(path)?,
        }]);
    }

    if FileManager::dir_exists(path) {
        let files = FileManager::find_scripts(path)?;
        if files.is_empty() {
            warn!("No .txt or .md scripts found in {:?}", path);
        }
        debug!("Found {} script(s) in {:?}", files.len(), path);
        return files
            .into_iter()
            .map(|file| {
                let text = FileManager::read_to_string(&file)?;
                Ok(ScriptInput {
                    path: Some(file),
                    text,
                })
            })
            .collect();
    }

    Err(anyhow!("Input path does not exist: {:?}", path))
}

fn read_single_input(args: &InputArgs) -> Result<ScriptInput> {
    let mut inputs = read_inputs(args)?;
    if inputs.len() != 1 {
        return Err(anyhow!(
            "Expected a single script, found {} (pass a file instead of a directory)",
            inputs.len()
        ));
    }
    inputs
        .pop()
        .ok_or_else(|| anyhow!("No input script"))
}

fn run_clean(
    pipeline: &ScriptPipeline,
    input: &InputArgs,
    output_dir: Option<&Path>,
    report: bool,
) -> Result<()> {
    let inputs = read_inputs(input)?;
    let multiple = inputs.len() > 1;

    for script in &inputs {
        let cleaned = pipeline.cleaner().clean_with_report(&script.text);
        for warning in &cleaned.report.warnings {
            warn!("{}: {}", script.label(), warning);
        }
        if report {
            eprintln!("{}", serde_json::to_string_pretty(&cleaned.report)?);
        }

        match (output_dir, &script.path) {
            (Some(dir), Some(path)) => {
                let output = FileManager::generate_output_path(path, dir, "clean", "txt");
                FileManager::write_to_file(&output, &cleaned.text)?;
                info!("Cleaned {} -> {}", script.label(), output.display());
            }
            (Some(dir), None) => {
                let output = dir.join("stdin.clean.txt");
                FileManager::write_to_file(&output, &cleaned.text)?;
                info!("Cleaned <stdin> -> {}", output.display());
            }
            (None, _) => {
                if multiple {
                    println!("==> {} <==", script.label());
                }
                println!("{}", cleaned.text);
            }
        }
    }

    Ok(())
}

fn run_estimate(pipeline: &ScriptPipeline, config: &Config, input: &InputArgs) -> Result<()> {
    let mut results = Vec::new();
    for script in read_inputs(input)? {
        let estimate = pipeline.estimate(&script.text);
        results.push(serde_json::json!({
            "path": script.label(),
            "shot_count": estimate.shot_count,
            "word_count": estimate.word_count,
            "signal": estimate.signal,
            "estimated_speech_secs": estimate.estimated_speech_secs(config.estimator.words_per_minute),
        }));
    }

    print_json_results(results)
}

fn run_prepare(pipeline: &ScriptPipeline, input: &InputArgs) -> Result<()> {
    let mut results = Vec::new();
    for script in read_inputs(input)? {
        let prepared = pipeline.prepare(&script.text);
        results.push(serde_json::json!({
            "path": script.label(),
            "cleaned": prepared.cleaned,
            "estimate": prepared.estimate,
        }));
    }

    print_json_results(results)
}

fn run_mask(pipeline: &ScriptPipeline, input: &InputArgs) -> Result<()> {
    let script = read_single_input(input)?;
    let masked = pipeline.protector().mask(&script.text);
    info!(
        "Masked {} span(s) from {}",
        masked.session.len(),
        script.label()
    );

    let document = serde_json::json!({
        "masked_text": masked.text,
        "session": masked.session,
        "report": masked.report,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn run_restore(pipeline: &ScriptPipeline, session_path: &Path, input: &InputArgs) -> Result<()> {
    let session = load_session(session_path)?;
    let script = read_single_input(input)?;

    let restored = pipeline.protector().restore(&script.text, &session);
    if let Some(warning) = restored.report.incomplete() {
        warn!("{}: {}", script.label(), warning);
    } else {
        info!(
            "Restored {}/{} span(s) into {}",
            restored.report.restored,
            restored.report.expected,
            script.label()
        );
    }

    print!("{}", restored.text);
    std::io::stdout().flush()?;
    Ok(())
}

async fn run_dry_run(
    pipeline: &ScriptPipeline,
    input: &InputArgs,
    voice: &str,
    uppercase: bool,
) -> Result<()> {
    let translator = if uppercase {
        MockTranslator::uppercase()
    } else {
        MockTranslator::identity()
    };
    let synthesizer = MockSynthesizer::working();

    let mut results = Vec::new();
    for script in read_inputs(input)? {
        let localized = pipeline
            .localize_and_speak(&translator, &synthesizer, &script.text, voice)
            .await
            .map_err(AppError::from)?;

        if let Some(warning) = localized.translation.restore_report.incomplete() {
            warn!("{}: {}", script.label(), warning);
        }
        results.push(serde_json::json!({
            "path": script.label(),
            "translation": localized.translation,
            "spoken_text": localized.spoken.cleaned.text,
            "audio_bytes": localized.spoken.audio.len(),
        }));
    }

    info!(
        "Dry run sent {} request(s) to the translator",
        translator.request_count()
    );
    print_json_results(results)
}

/// Accept either the full `mask` output or a bare session object
fn load_session(path: &Path) -> Result<MaskingSession> {
    let content = FileManager::read_to_string(path)?;
    let mut value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session file: {:?}", path))?;

    let session = value
        .get_mut("session")
        .map(serde_json::Value::take)
        .unwrap_or(value);
    serde_json::from_value(session)
        .with_context(|| format!("Failed to read masking session from {:?}", path))
}

fn print_json_results(mut results: Vec<serde_json::Value>) -> Result<()> {
    let output = if results.len() == 1 {
        results.remove(0)
    } else {
        serde_json::Value::Array(results)
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
