//! Configuration support for yamlfix.
//!
//! This module provides:
//! - The typed settings record with defaults
//! - Loading `pyproject.toml` / explicit TOML and YAML sources
//! - Hoisting the `[tool.yamlfix]` section onto flat keys
//! - Environment variable overrides
//! - Resolving all of the above into one [`YamlfixConfig`]

mod env;
mod file;
mod model;
mod resolve;
mod value;

pub use env::{parse_env_overrides, OverrideMap, DEFAULT_ENV_PREFIX};
pub use file::{
    find_config_file, find_file_upward, load_config, load_sources, namespace_section,
    project_schema, ConfigError, LoadedSources, SchemaBinding, DEFAULT_SOURCE_FILES, TOOL_NAME,
    TOOL_TABLE,
};
pub use model::{SequenceStyle, YamlfixConfig, SETTING_NAMES};
pub use resolve::{configure_yamlfix, starting_path, ConfigResolver, CONFIG_PATH_KEY};
pub use value::{merge_mappings, RawMapping, RawValue};
