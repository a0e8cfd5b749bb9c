pub mod config;
pub mod error;
pub mod formatter;
pub mod normalize;
pub mod walker;

pub use config::{
    configure_yamlfix, parse_env_overrides, ConfigError, ConfigResolver, OverrideMap,
    SchemaBinding, SequenceStyle, YamlfixConfig, DEFAULT_ENV_PREFIX,
};
pub use error::Error;
pub use formatter::{FixOutcome, Formatter, TargetFile, TextFormatter};
pub use normalize::{normalize_content, NormalizeResult};
pub use walker::{discover, DEFAULT_INCLUDE_GLOBS};

use std::path::PathBuf;

use tracing::{debug, info, warn};

/// Positional argument meaning "read one document from standard input".
pub const STDIN_ARG: &str = "-";

/// Parsed command line input for one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub files: Vec<String>,
    pub check: bool,
    pub config_files: Vec<PathBuf>,
    pub env_prefix: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            files: vec![],
            check: false,
            config_files: vec![],
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            include: DEFAULT_INCLUDE_GLOBS.iter().map(|s| s.to_string()).collect(),
            exclude: vec![],
        }
    }
}

/// What happened in a run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunResult {
    /// Number of sources handed to the formatter
    pub files: usize,
    /// Fixed text to print (stdin input)
    pub output: Option<String>,
    /// Whether any source needed changes
    pub changed: bool,
}

impl RunResult {
    /// Whether the run should exit non-zero under `--check`.
    pub fn has_problems(&self, check: bool) -> bool {
        check && self.changed
    }
}

/// Reject `-` mixed with other paths. Touches nothing on disk.
pub fn validate_files(files: &[String]) -> Result<bool, Error> {
    let reads_stdin = files.iter().any(|f| f == STDIN_ARG);
    if reads_stdin && files.len() > 1 {
        return Err(Error::Usage(
            "Cannot specify '-' and other files at the same time.".to_string(),
        ));
    }
    Ok(reads_stdin)
}

/// Main entry point: resolve configuration, discover files and fix them.
///
/// `env` is a snapshot of the process environment; only variables carrying
/// `options.env_prefix` are used.
pub fn run<I, K, V>(options: &RunOptions, env: I, formatter: &dyn Formatter) -> Result<RunResult, Error>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let reads_stdin = validate_files(&options.files)?;

    let mut config = YamlfixConfig::default();
    let overrides = parse_env_overrides(env, &options.env_prefix);
    debug!(exclude_dirs = ?config.exclude_dirs, "config before loading");
    configure_yamlfix(&mut config, &options.config_files, Some(&overrides))?;
    debug!(exclude_dirs = ?config.exclude_dirs, "config after loading");

    let mut targets = if reads_stdin {
        vec![TargetFile::Stdin]
    } else {
        let mut excludes = options.exclude.clone();
        excludes.extend(config.exclude_dirs.iter().cloned());
        debug!(?excludes, "exclude patterns");

        let paths = discover(&options.files, &options.include, &excludes);
        paths
            .iter()
            .map(|path| {
                TargetFile::open(path).map_err(|source| Error::Open {
                    path: path.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    if targets.is_empty() {
        warn!("No YAML files found!");
        return Ok(RunResult::default());
    }

    info!(
        "YamlFix: {} files",
        if options.check { "Checking" } else { "Fixing" }
    );

    let outcome = formatter
        .fix_files(&mut targets, options.check, &config)
        .map_err(Error::Format)?;

    Ok(RunResult {
        files: targets.len(),
        output: outcome.output,
        changed: outcome.changed,
    })
}
