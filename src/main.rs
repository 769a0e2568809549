// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use scenevox::app_config::{self, Config, Service};
use scenevox::app_controller::{Controller, DEFAULT_IMAGE_OUTPUT, DEFAULT_SCENE_OUTPUT};
use scenevox::server;

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
    /// Assemble a script (or every script in a directory) into one dialogue track
    Scene {
        /// Script file, or a directory of .md/.txt scripts
        #[arg(value_name = "SCRIPT_PATH")]
        input_path: PathBuf,

        /// Output file (single script only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Write one audio file per dialogue line
    Clips {
        /// Script file
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "clips")]
        output_dir: PathBuf,
    },

    /// Print the parsed dialogue lines as JSON
    Parse {
        /// Script file
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
    },

    /// Draft a screenplay from a storyline with a language model
    Write {
        /// Storyline to dramatize
        #[arg(value_name = "STORYLINE")]
        storyline: String,

        /// Output script file
        #[arg(short, long, default_value = "script.md")]
        output: PathBuf,
    },

    /// Generate a scene image
    Image {
        /// Image prompt
        #[arg(value_name = "PROMPT", required_unless_present = "from_script")]
        prompt: Option<String>,

        /// Derive the prompt from a script with the language model
        #[arg(long, value_name = "SCRIPT", conflicts_with = "prompt")]
        from_script: Option<PathBuf>,

        /// Output PNG file
        #[arg(short, long, default_value = DEFAULT_IMAGE_OUTPUT)]
        output: PathBuf,
    },

    /// Draft a script, then render its image and dialogue track in one go
    Movie {
        /// Storyline to dramatize
        #[arg(value_name = "STORYLINE")]
        storyline: String,

        /// Directory for the script, image, track and instructions
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate shell completions for scenevox
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// scenevox - spoken dialogue scenes from screenplay scripts
///
/// Parses `**CHARACTER**` / "quoted line" scripts, voices every line with a
/// text-to-speech provider and stitches the clips into one track.
#[derive(Parser, Debug)]
#[command(name = "scenevox")]
#[command(version)]
#[command(about = "Turn screenplay scripts into spoken dialogue tracks")]
#[command(long_about = "scenevox turns screenplay scripts into spoken dialogue tracks.

EXAMPLES:
    scenevox scene act1.md                      # Write scene_output.mp3
    scenevox scene act1.md -o act1.mp3          # Choose the output file
    scenevox scene scripts/ -f                  # Every script in a folder, overwriting
    scenevox clips act1.md -o clips/            # One file per line
    scenevox parse act1.md                      # Show what will be spoken
    scenevox write \"two friends meet\"           # Draft script.md
    scenevox image --from-script act1.md        # Scene image from a script
    scenevox movie \"a heist gone wrong\" -o out/ # Script, image and track together
    scenevox serve --port 8080                  # Run the HTTP API
    scenevox completions bash > scenevox.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one will be created automatically. API keys may also come from
    ELEVENLABS_API_KEY, OPENAI_API_KEY and STABILITY_AI_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: PathBuf,

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

    // @returns: Symbol and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("✖", "1;31"),
            Level::Warn => ("⚠", "1;33"),
            Level::Info => ("•", "1;32"),
            Level::Debug => ("◆", "1;36"),
            Level::Trace => ("·", "1;35"),
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
            let (symbol, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, symbol, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() {
    // The logger accepts everything; the effective level is set below
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "scenevox", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd_log_level) = &cli.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    config.apply_env_overrides();
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(level_filter(&config.log_level));

    match cli.command {
        Commands::Scene { input_path, output, force_overwrite } => {
            config.require_api_key(Service::Speech)?;
            let controller = Controller::with_config(config)?;

            if input_path.is_dir() {
                if output.is_some() {
                    return Err(anyhow!("--output cannot be used with a directory"));
                }
                let summary = controller.run_scene_folder(&input_path, force_overwrite).await?;
                if summary.failed > 0 {
                    return Err(anyhow!("{} script(s) failed", summary.failed));
                }
            } else {
                let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_SCENE_OUTPUT));
                if let Some(report) = controller.run_scene(&input_path, &output, force_overwrite).await? {
                    println!("{}", report);
                }
            }
        }
        Commands::Clips { script, output_dir } => {
            config.require_api_key(Service::Speech)?;
            let controller = Controller::with_config(config)?;
            let summary = controller.run_clips(&script, &output_dir).await?;
            println!("{} clips written, {} skipped", summary.written.len(), summary.skipped);
        }
        Commands::Parse { script } => {
            let controller = Controller::with_config(config)?;
            let lines = controller.run_parse(&script)?;
            let json = serde_json::to_string_pretty(&lines).context("Failed to serialize parsed lines")?;
            println!("{}", json);
        }
        Commands::Write { storyline, output } => {
            config.require_api_key(Service::Screenwriter)?;
            let controller = Controller::with_config(config)?;
            controller.run_write(&storyline, &output).await?;
        }
        Commands::Image { prompt, from_script, output } => {
            config.require_api_key(Service::Image)?;
            if from_script.is_some() {
                config.require_api_key(Service::Screenwriter)?;
            }
            let controller = Controller::with_config(config)?;

            let prompt = match (prompt, from_script) {
                (Some(prompt), _) => prompt,
                (None, Some(script)) => {
                    let (visual, _) = controller.run_describe(&script).await?;
                    info!("Image prompt: {}", visual);
                    visual
                }
                (None, None) => return Err(anyhow!("Either PROMPT or --from-script is required")),
            };
            controller.run_image(&prompt, &output).await?;
        }
        Commands::Movie { storyline, output_dir } => {
            config.require_api_key(Service::Screenwriter)?;
            config.require_api_key(Service::Image)?;
            config.require_api_key(Service::Speech)?;
            let controller = Controller::with_config(config)?;
            let artifacts = controller.run_movie(&storyline, &output_dir).await?;
            println!("{}", artifacts.report);
            println!("Script: {}", artifacts.script.display());
            println!("Image: {}", artifacts.image.display());
            println!("Audio: {}", artifacts.audio.display());
            println!("Instructions: {}", artifacts.instructions.display());
        }
        Commands::Serve { port } => {
            config.require_api_key(Service::Speech)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(&config).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
