//! Config source discovery and loading

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::model::YamlfixConfig;
use super::value::{merge_mappings, RawMapping};

/// Outer table of the namespaced section (`[tool.yamlfix]`).
pub const TOOL_TABLE: &str = "tool";
/// Inner table of the namespaced section (`[tool.yamlfix]`).
pub const TOOL_NAME: &str = "yamlfix";

/// Files looked up when no explicit config source is given.
pub const DEFAULT_SOURCE_FILES: &[&str] = &["pyproject.toml"];

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested source does not exist
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// IO error reading the file
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse config file {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// YAML parsing error
    #[error("failed to parse config file {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The file extension is not one we know how to parse
    #[error("unsupported config file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// A value could not be converted to the setting's type
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Whether the schema projection binds the namespaced `[tool.yamlfix]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaBinding {
    /// Only flat top-level keys are bound; the namespaced table is invisible.
    TopLevel,
    /// Flat keys are bound, then the namespaced table on top of them.
    #[default]
    Namespaced,
}

/// Everything read from the config sources of one run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoadedSources {
    /// Union of all sources, unvalidated
    pub raw: RawMapping,
    /// Recognized settings only, type-checked against [`YamlfixConfig`]
    pub schema: RawMapping,
}

/// Search upward from `start_dir` for a file with the given name.
///
/// If `stop_at_git_root` is true, stops searching when a `.git` directory is found.
/// Returns `None` if the file is not found.
pub fn find_file_upward(
    start_dir: &Path,
    filename: &str,
    stop_at_git_root: bool,
) -> Option<PathBuf> {
    for dir in start_dir.ancestors() {
        let candidate = dir.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
        if stop_at_git_root && dir.join(".git").exists() {
            break;
        }
    }
    None
}

/// Find `pyproject.toml` (or another default source) by searching upward.
///
/// Stops at the first match, or at the git repository root, whichever comes first.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    DEFAULT_SOURCE_FILES
        .iter()
        .find_map(|name| find_file_upward(start_dir, name, true))
}

/// Load and parse a single config source, choosing the parser by extension.
pub fn load_config(path: &Path) -> Result<RawMapping, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "toml" => toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        "yaml" | "yml" => {
            if content.trim().is_empty() {
                return Ok(RawMapping::new());
            }
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Locate, parse and merge every config source of a run.
///
/// Explicit `source_files` are used as given when they exist, otherwise their
/// file name is searched upward from `starting_path`. Without explicit files
/// the default sources are searched upward from `starting_path` (or the
/// current directory).
pub fn load_sources(
    source_files: &[PathBuf],
    starting_path: Option<&Path>,
    binding: SchemaBinding,
) -> Result<LoadedSources, ConfigError> {
    let paths = if source_files.is_empty() {
        default_sources(starting_path)
    } else {
        source_files
            .iter()
            .map(|file| locate_source(file, starting_path))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut raw = RawMapping::new();
    for path in &paths {
        debug!(path = %path.display(), "loading config source");
        merge_mappings(&mut raw, load_config(path)?);
    }

    let schema = project_schema(&raw, binding)?;
    Ok(LoadedSources { raw, schema })
}

/// The `[tool.yamlfix]` table of `raw`, if present.
pub fn namespace_section(raw: &RawMapping) -> Option<&RawMapping> {
    raw.get(TOOL_TABLE)?.as_table()?.get(TOOL_NAME)?.as_table()
}

/// Project `raw` onto the recognized settings, validating each value.
pub fn project_schema(raw: &RawMapping, binding: SchemaBinding) -> Result<RawMapping, ConfigError> {
    let mut projection: RawMapping = raw
        .iter()
        .filter(|(key, _)| YamlfixConfig::has_setting(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if binding == SchemaBinding::Namespaced {
        if let Some(section) = namespace_section(raw) {
            for (key, value) in section {
                if YamlfixConfig::has_setting(key) {
                    projection.insert(key.clone(), value.clone());
                }
            }
        }
    }

    let mut validated = YamlfixConfig::default();
    for (key, value) in &projection {
        validated.set(key, value)?;
    }

    Ok(projection)
}

fn locate_source(file: &Path, starting_path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if file.is_file() {
        return Ok(file.to_path_buf());
    }

    let found = match (starting_path, file.file_name().and_then(|n| n.to_str())) {
        (Some(start), Some(name)) => find_file_upward(start, name, false),
        _ => None,
    };

    found.ok_or_else(|| ConfigError::NotFound(file.to_path_buf()))
}

fn default_sources(starting_path: Option<&Path>) -> Vec<PathBuf> {
    let start = match starting_path {
        Some(path) => path.to_path_buf(),
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(_) => return Vec::new(),
        },
    };

    find_config_file(&start).into_iter().collect()
}
