//! Configuration resolution
//!
//! Priority: overrides > `[tool.yamlfix]` > flat keys > defaults

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::env::OverrideMap;
use super::file::{load_sources, namespace_section, ConfigError, SchemaBinding};
use super::model::YamlfixConfig;
use super::value::{RawMapping, RawValue};

/// Override key that sets the directory where config lookup starts.
pub const CONFIG_PATH_KEY: &str = "config_path";

/// Key whose absence from the schema projection triggers the manual fallback.
const FALLBACK_MARKER_KEY: &str = "exclude_dirs";

/// Applies config sources and overrides onto a [`YamlfixConfig`].
#[derive(Debug, Default, Clone)]
pub struct ConfigResolver {
    binding: SchemaBinding,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose how the schema projection treats the namespaced table.
    pub fn schema_binding(mut self, binding: SchemaBinding) -> Self {
        self.binding = binding;
        self
    }

    /// Load `config_files` (or the default sources) and `overrides` into `config`.
    ///
    /// Settings are applied to a copy that replaces `config` only once every
    /// value has been coerced; on error `config` is left untouched.
    pub fn resolve(
        &self,
        config: &mut YamlfixConfig,
        config_files: &[PathBuf],
        overrides: Option<&OverrideMap>,
    ) -> Result<(), ConfigError> {
        let starting_path = starting_path(config_files, overrides);
        debug!(
            ?config_files,
            starting_path = ?starting_path,
            "loading configuration"
        );

        let loaded = load_sources(config_files, starting_path.as_deref(), self.binding)?;
        let mut raw = loaded.raw;
        debug!(raw = %RawValue::Table(raw.clone()), "raw config");

        let section = namespace_section(&raw).cloned().unwrap_or_default();
        if !section.is_empty() {
            debug!(section = %RawValue::Table(section.clone()), "found [tool.yamlfix] section");
            for (key, value) in &section {
                raw.insert(key.clone(), value.clone());
            }
        }

        if let Some(overrides) = overrides {
            apply_overrides(&mut raw, overrides);
        }

        debug!(schema = %RawValue::Table(loaded.schema.clone()), "schema config");
        let schema_missed_section =
            !section.is_empty() && !loaded.schema.contains_key(FALLBACK_MARKER_KEY);
        let final_config: RawMapping = if schema_missed_section {
            debug!("schema projection missed [tool.yamlfix], using hoisted values");
            raw.into_iter()
                .filter(|(key, _)| YamlfixConfig::has_setting(key))
                .collect()
        } else {
            let mut schema = loaded.schema;
            if let Some(overrides) = overrides {
                apply_overrides(&mut schema, overrides);
            }
            schema
        };

        let mut next = config.clone();
        for (key, value) in &final_config {
            if next.set(key, value)? {
                debug!(%key, %value, "setting");
            } else {
                trace!(%key, "ignoring unknown setting");
            }
        }

        *config = next;
        Ok(())
    }
}

/// Resolve with the default schema binding. See [`ConfigResolver::resolve`].
pub fn configure_yamlfix(
    config: &mut YamlfixConfig,
    config_files: &[PathBuf],
    overrides: Option<&OverrideMap>,
) -> Result<(), ConfigError> {
    ConfigResolver::new().resolve(config, config_files, overrides)
}

/// Directory where config lookup starts.
///
/// An explicit `config_path` override wins, then the parent of the first
/// config file; otherwise the default search location is used.
pub fn starting_path(config_files: &[PathBuf], overrides: Option<&OverrideMap>) -> Option<PathBuf> {
    if let Some(path) = overrides
        .and_then(|o| o.get(CONFIG_PATH_KEY))
        .filter(|p| !p.is_empty())
    {
        return Some(PathBuf::from(path));
    }

    config_files.first().map(|file| match file.parent() {
        Some(parent) if parent != Path::new("") => parent.to_path_buf(),
        _ => PathBuf::from("."),
    })
}

fn apply_overrides(mapping: &mut RawMapping, overrides: &OverrideMap) {
    for (key, value) in overrides {
        mapping.insert(key.clone(), RawValue::String(value.clone()));
    }
}
