//! The typed settings record every configuration source writes into

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::file::ConfigError;
use super::value::RawValue;

/// How sequences are rendered by the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceStyle {
    #[default]
    FlowStyle,
    BlockStyle,
    KeepStyle,
}

impl SequenceStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceStyle::FlowStyle => "flow_style",
            SequenceStyle::BlockStyle => "block_style",
            SequenceStyle::KeepStyle => "keep_style",
        }
    }
}

impl fmt::Display for SequenceStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SequenceStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flow_style" => Ok(SequenceStyle::FlowStyle),
            "block_style" => Ok(SequenceStyle::BlockStyle),
            "keep_style" => Ok(SequenceStyle::KeepStyle),
            other => Err(format!(
                "unknown sequence style '{other}' (expected flow_style, block_style or keep_style)"
            )),
        }
    }
}

/// Names of every recognized setting, in declaration order.
pub const SETTING_NAMES: &[&str] = &[
    "allow_duplicate_keys",
    "comments_min_spaces_from_content",
    "comments_require_starting_space",
    "comments_whitelines",
    "whitelines",
    "section_whitelines",
    "config_path",
    "exclude_dirs",
    "explicit_start",
    "indent_mapping",
    "indent_offset",
    "indent_sequence",
    "line_length",
    "none_representation",
    "preserve_quotes",
    "quote_basic_values",
    "quote_keys_and_basic_values",
    "quote_representation",
    "sequence_style",
];

/// Effective yamlfix settings.
///
/// Built with defaults once per run, filled in place by the resolver and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlfixConfig {
    /// Keep duplicate mapping keys instead of failing (default: false)
    pub allow_duplicate_keys: bool,
    /// Minimum spaces between content and an inline comment (default: 2)
    pub comments_min_spaces_from_content: usize,
    /// Require a space after `#` (default: true)
    pub comments_require_starting_space: bool,
    /// Blank lines allowed around comments (default: 1)
    pub comments_whitelines: usize,
    /// Blank lines allowed between entries (default: 0)
    pub whitelines: usize,
    /// Blank lines allowed between top-level sections (default: 0)
    pub section_whitelines: usize,
    /// Directory where configuration lookup starts
    pub config_path: Option<String>,
    /// Root-relative globs that are never discovered
    pub exclude_dirs: Vec<String>,
    /// Start every document with `---` (default: true)
    pub explicit_start: bool,
    pub indent_mapping: usize,
    pub indent_offset: usize,
    pub indent_sequence: usize,
    /// Maximum line width (default: 80)
    pub line_length: usize,
    /// How null values are written (default: empty)
    pub none_representation: String,
    pub preserve_quotes: bool,
    pub quote_basic_values: bool,
    pub quote_keys_and_basic_values: bool,
    /// Quote character used when quoting is enabled (default: `'`)
    pub quote_representation: String,
    pub sequence_style: SequenceStyle,
}

impl Default for YamlfixConfig {
    fn default() -> Self {
        Self {
            allow_duplicate_keys: false,
            comments_min_spaces_from_content: 2,
            comments_require_starting_space: true,
            comments_whitelines: 1,
            whitelines: 0,
            section_whitelines: 0,
            config_path: None,
            exclude_dirs: Vec::new(),
            explicit_start: true,
            indent_mapping: 2,
            indent_offset: 2,
            indent_sequence: 4,
            line_length: 80,
            none_representation: String::new(),
            preserve_quotes: false,
            quote_basic_values: false,
            quote_keys_and_basic_values: false,
            quote_representation: "'".to_string(),
            sequence_style: SequenceStyle::default(),
        }
    }
}

impl YamlfixConfig {
    /// Whether `key` names a recognized setting. Lookup is case-sensitive.
    pub fn has_setting(key: &str) -> bool {
        SETTING_NAMES.contains(&key)
    }

    /// Current value of a setting, or `None` for unknown keys and unset options.
    pub fn get(&self, key: &str) -> Option<RawValue> {
        let value = match key {
            "allow_duplicate_keys" => RawValue::Bool(self.allow_duplicate_keys),
            "comments_min_spaces_from_content" => int(self.comments_min_spaces_from_content),
            "comments_require_starting_space" => {
                RawValue::Bool(self.comments_require_starting_space)
            }
            "comments_whitelines" => int(self.comments_whitelines),
            "whitelines" => int(self.whitelines),
            "section_whitelines" => int(self.section_whitelines),
            "config_path" => RawValue::String(self.config_path.clone()?),
            "exclude_dirs" => RawValue::List(
                self.exclude_dirs
                    .iter()
                    .map(|s| RawValue::String(s.clone()))
                    .collect(),
            ),
            "explicit_start" => RawValue::Bool(self.explicit_start),
            "indent_mapping" => int(self.indent_mapping),
            "indent_offset" => int(self.indent_offset),
            "indent_sequence" => int(self.indent_sequence),
            "line_length" => int(self.line_length),
            "none_representation" => RawValue::String(self.none_representation.clone()),
            "preserve_quotes" => RawValue::Bool(self.preserve_quotes),
            "quote_basic_values" => RawValue::Bool(self.quote_basic_values),
            "quote_keys_and_basic_values" => RawValue::Bool(self.quote_keys_and_basic_values),
            "quote_representation" => RawValue::String(self.quote_representation.clone()),
            "sequence_style" => RawValue::String(self.sequence_style.to_string()),
            _ => return None,
        };
        Some(value)
    }

    /// Assign `value` to the setting named `key`, coercing it to the setting's type.
    ///
    /// Returns `Ok(false)` when `key` is not a recognized setting; the value is
    /// ignored in that case. A null leaves the setting unchanged, except for
    /// `config_path`, which it clears.
    pub fn set(&mut self, key: &str, value: &RawValue) -> Result<bool, ConfigError> {
        if *value == RawValue::Null {
            if key == "config_path" {
                self.config_path = None;
            }
            return Ok(Self::has_setting(key));
        }

        let applied = match key {
            "allow_duplicate_keys" => to_bool(value).map(|v| self.allow_duplicate_keys = v),
            "comments_min_spaces_from_content" => {
                to_usize(value).map(|v| self.comments_min_spaces_from_content = v)
            }
            "comments_require_starting_space" => {
                to_bool(value).map(|v| self.comments_require_starting_space = v)
            }
            "comments_whitelines" => to_usize(value).map(|v| self.comments_whitelines = v),
            "whitelines" => to_usize(value).map(|v| self.whitelines = v),
            "section_whitelines" => to_usize(value).map(|v| self.section_whitelines = v),
            "config_path" => to_string(value).map(|v| self.config_path = Some(v)),
            "exclude_dirs" => to_string_list(value).map(|v| self.exclude_dirs = v),
            "explicit_start" => to_bool(value).map(|v| self.explicit_start = v),
            "indent_mapping" => to_usize(value).map(|v| self.indent_mapping = v),
            "indent_offset" => to_usize(value).map(|v| self.indent_offset = v),
            "indent_sequence" => to_usize(value).map(|v| self.indent_sequence = v),
            "line_length" => to_usize(value).map(|v| self.line_length = v),
            "none_representation" => to_string(value).map(|v| self.none_representation = v),
            "preserve_quotes" => to_bool(value).map(|v| self.preserve_quotes = v),
            "quote_basic_values" => to_bool(value).map(|v| self.quote_basic_values = v),
            "quote_keys_and_basic_values" => {
                to_bool(value).map(|v| self.quote_keys_and_basic_values = v)
            }
            "quote_representation" => to_string(value).map(|v| self.quote_representation = v),
            "sequence_style" => to_string(value)
                .and_then(|s| s.parse())
                .map(|v| self.sequence_style = v),
            _ => return Ok(false),
        };

        applied.map(|()| true).map_err(|reason| ConfigError::InvalidValue {
            key: key.to_string(),
            reason,
        })
    }
}

fn int(value: usize) -> RawValue {
    RawValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

fn to_bool(value: &RawValue) -> Result<bool, String> {
    match value {
        RawValue::Bool(b) => Ok(*b),
        RawValue::Integer(0) => Ok(false),
        RawValue::Integer(1) => Ok(true),
        RawValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(format!("expected a boolean, got {value}")),
        },
        _ => Err(format!("expected a boolean, got {value}")),
    }
}

fn to_usize(value: &RawValue) -> Result<usize, String> {
    match value {
        RawValue::Integer(i) => {
            usize::try_from(*i).map_err(|_| format!("expected a non-negative integer, got {i}"))
        }
        RawValue::String(s) => s
            .trim()
            .parse()
            .map_err(|_| format!("expected a non-negative integer, got {value}")),
        _ => Err(format!("expected a non-negative integer, got {value}")),
    }
}

fn to_string(value: &RawValue) -> Result<String, String> {
    match value {
        RawValue::String(s) => Ok(s.clone()),
        RawValue::Bool(b) => Ok(b.to_string()),
        RawValue::Integer(i) => Ok(i.to_string()),
        RawValue::Float(x) => Ok(x.to_string()),
        _ => Err(format!("expected a string, got {value}")),
    }
}

fn to_string_list(value: &RawValue) -> Result<Vec<String>, String> {
    match value {
        RawValue::List(items) => items.iter().map(to_string).collect(),
        RawValue::String(s) => parse_list_string(s),
        _ => Err(format!("expected a list of strings, got {value}")),
    }
}

/// Parse a list given as a single string, e.g. from an environment variable.
///
/// Accepts an inline array (`["a", "b"]`) or comma-separated items; a string
/// without delimiters is a one-element list.
fn parse_list_string(s: &str) -> Result<Vec<String>, String> {
    let trimmed = s.trim();
    if trimmed.starts_with('[') {
        #[derive(Deserialize)]
        struct Inline {
            items: Vec<String>,
        }
        let inline: Inline = toml::from_str(&format!("items = {trimmed}"))
            .map_err(|e| format!("invalid inline list {trimmed:?}: {}", e.message()))?;
        return Ok(inline.items);
    }

    Ok(trimmed
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = YamlfixConfig::default();
        assert!(config.exclude_dirs.is_empty());
        assert_eq!(config.line_length, 80);
        assert_eq!(config.sequence_style, SequenceStyle::FlowStyle);
        assert!(config.explicit_start);
        assert_eq!(config.quote_representation, "'");
        assert_eq!(config.config_path, None);
    }

    #[test]
    fn test_every_setting_name_round_trips_through_get_and_set() {
        let mut config = YamlfixConfig::default();
        config.config_path = Some("/tmp".into());

        for name in SETTING_NAMES {
            assert!(YamlfixConfig::has_setting(name));
            let value = config.get(name).unwrap();
            assert!(config.set(name, &value).unwrap(), "{name}");
        }
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut config = YamlfixConfig::default();
        assert!(!YamlfixConfig::has_setting("not_a_setting"));
        assert!(!config.set("not_a_setting", &RawValue::Integer(1)).unwrap());
        assert_eq!(config.get("not_a_setting"), None);
        assert_eq!(config, YamlfixConfig::default());
    }

    #[test]
    fn test_null_leaves_setting_unset() {
        let mut config = YamlfixConfig::default();
        config.config_path = Some("/srv/project".into());

        assert!(config.set("line_length", &RawValue::Null).unwrap());
        assert!(config.set("config_path", &RawValue::Null).unwrap());
        assert!(!config.set("not_a_setting", &RawValue::Null).unwrap());

        assert_eq!(config, YamlfixConfig::default());
    }

    #[test]
    fn test_setting_names_are_case_sensitive() {
        let mut config = YamlfixConfig::default();
        assert!(!config.set("LINE_LENGTH", &RawValue::Integer(100)).unwrap());
        assert_eq!(config.line_length, 80);
    }

    #[test]
    fn test_integer_coerced_from_string() {
        let mut config = YamlfixConfig::default();
        config.set("line_length", &RawValue::from("100")).unwrap();
        assert_eq!(config.line_length, 100);
    }

    #[test]
    fn test_bool_coerced_from_string() {
        let mut config = YamlfixConfig::default();
        config.set("explicit_start", &RawValue::from("False")).unwrap();
        assert!(!config.explicit_start);
        config.set("preserve_quotes", &RawValue::from("yes")).unwrap();
        assert!(config.preserve_quotes);
    }

    #[test]
    fn test_sequence_style_from_string() {
        let mut config = YamlfixConfig::default();
        config.set("sequence_style", &RawValue::from("block_style")).unwrap();
        assert_eq!(config.sequence_style, SequenceStyle::BlockStyle);
    }

    #[test]
    fn test_list_from_toml_array() {
        let mut config = YamlfixConfig::default();
        let value = RawValue::List(vec![RawValue::from("vendor/**"), RawValue::from("build")]);
        config.set("exclude_dirs", &value).unwrap();
        assert_eq!(config.exclude_dirs, vec!["vendor/**", "build"]);
    }

    #[test]
    fn test_list_from_plain_string() {
        let mut config = YamlfixConfig::default();
        config.set("exclude_dirs", &RawValue::from("vendor")).unwrap();
        assert_eq!(config.exclude_dirs, vec!["vendor"]);

        config.set("exclude_dirs", &RawValue::from("a/*, b/*")).unwrap();
        assert_eq!(config.exclude_dirs, vec!["a/*", "b/*"]);
    }

    #[test]
    fn test_list_from_inline_array_string() {
        let mut config = YamlfixConfig::default();
        config
            .set("exclude_dirs", &RawValue::from(r#"["a/**", "b,c"]"#))
            .unwrap();
        assert_eq!(config.exclude_dirs, vec!["a/**", "b,c"]);
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let mut config = YamlfixConfig::default();

        let result = config.set("line_length", &RawValue::from("wide"));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "line_length"
        ));

        assert!(config.set("sequence_style", &RawValue::from("zigzag")).is_err());
        assert!(config.set("line_length", &RawValue::Integer(-1)).is_err());
        assert!(config.set("explicit_start", &RawValue::List(vec![])).is_err());
        assert_eq!(config, YamlfixConfig::default());
    }
}
