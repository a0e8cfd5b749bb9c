use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use yamlfix::{run, RunOptions, TextFormatter, DEFAULT_ENV_PREFIX};

/// Corrects the source code of the specified files.
///
/// Specify a directory to recursively fix all YAML files in it.
/// Use - to read from stdin. No other files can be specified in this case.
#[derive(Parser)]
#[command(name = "yamlfix")]
#[command(version, about)]
struct Cli {
    /// Target files or directories, or - for stdin
    #[arg(required = true)]
    files: Vec<String>,

    /// Enable verbose logging (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Check if file(s) need fixing. No files will be written in this case.
    #[arg(long)]
    check: bool,

    /// Path to a custom configuration file (repeatable, later files win)
    #[arg(short, long = "config-file", value_name = "PATH")]
    config_file: Vec<PathBuf>,

    /// Read yamlfix relevant environment variables starting with this prefix
    #[arg(long, value_name = "PREFIX", default_value = DEFAULT_ENV_PREFIX)]
    env_prefix: String,

    /// Files matching this glob pattern will be ignored
    #[arg(short, long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Files matching this glob pattern will be included, unless they are also excluded
    #[arg(short, long, value_name = "GLOB", default_values = ["*.yaml", "*.yml"])]
    include: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = RunOptions {
        files: cli.files,
        check: cli.check,
        config_files: cli.config_file,
        env_prefix: cli.env_prefix,
        include: cli.include,
        exclude: cli.exclude,
    };

    let env = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));

    match run(&options, env, &TextFormatter) {
        Ok(result) => {
            if let Some(fixed) = &result.output {
                print!("{fixed}");
            }
            if result.has_problems(options.check) {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .with(filter)
        .try_init();
}
