// lgrid - lubrication survey reconciliation from the command line

mod exit_codes;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "lgrid")]
#[command(about = "Reconcile lubrication survey exports into one classified record set")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge, deduplicate and classify survey CSV files
    #[command(after_help = "\
Examples:
  lgrid run week1.csv week2.csv
  lgrid run week*.csv --sort --json
  lgrid run week*.csv --output result.json --export-dir out/
  lgrid run week*.csv --config site.toml --strict")]
    Run {
        /// Survey CSV files, in precedence order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Pipeline config (TOML); defaults to the per-user config, then built-ins
        #[arg(long, env = "LUBEGRID_CONFIG")]
        config: Option<PathBuf>,

        /// Sort by status before dedupe so completed rows win
        #[arg(long)]
        sort: bool,

        /// Compare markers and identifiers ignoring case
        #[arg(long)]
        case_insensitive: bool,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write combined, done, todo and every bucket as CSV into this directory
        #[arg(long, value_name = "DIR")]
        export_dir: Option<PathBuf>,

        /// Exit non-zero when the run reports diagnostics
        #[arg(long)]
        strict: bool,

        /// Suppress the summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Print the unified column schema of survey files
    #[command(after_help = "\
Examples:
  lgrid schema week1.csv week2.csv
  lgrid schema week*.csv --json")]
    Schema {
        /// Survey CSV files, in precedence order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a pipeline config without running
    #[command(after_help = "\
Examples:
  lgrid validate site.toml")]
    Validate {
        /// Path to the pipeline config
        config: PathBuf,
    },

    /// Print the built-in configuration as TOML
    #[command(after_help = "\
Examples:
  lgrid config > site.toml
  lgrid config --path")]
    Config {
        /// Print the per-user config location instead
        #[arg(long)]
        path: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  lubegrid-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: lgrid <command> [options]");
            eprintln!("       lgrid --help for more information");
            Err(CliError::args(""))
        }
        Some(Commands::Run {
            files,
            config,
            sort,
            case_insensitive,
            json,
            output,
            export_dir,
            strict,
            quiet,
        }) => pipeline::cmd_run(pipeline::RunArgs {
            files,
            config,
            sort,
            case_insensitive,
            json,
            output,
            export_dir,
            strict,
            quiet,
        }),
        Some(Commands::Schema { files, json }) => pipeline::cmd_schema(files, json),
        Some(Commands::Validate { config }) => pipeline::cmd_validate(config),
        Some(Commands::Config { path }) => pipeline::cmd_config(path),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<lubegrid_recon::PipelineError> for CliError {
    fn from(err: lubegrid_recon::PipelineError) -> Self {
        use lubegrid_recon::PipelineError;
        match err {
            PipelineError::Io(_) => CliError::io(err.to_string()),
            PipelineError::ConfigParse(_) | PipelineError::ConfigValidation(_) => {
                CliError::config(err.to_string())
                    .with_hint("run `lgrid config` to see every key with its default")
            }
        }
    }
}
