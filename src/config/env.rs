//! Environment variables as configuration overrides

use std::collections::BTreeMap;

use tracing::trace;

/// Flat key → string overrides applied after every config source.
pub type OverrideMap = BTreeMap<String, String>;

/// Default prefix for yamlfix environment variables.
pub const DEFAULT_ENV_PREFIX: &str = "YAMLFIX";

/// Collect `<PREFIX>_<KEY>` variables from an environment snapshot.
///
/// Prefix matching is case-insensitive. Keys are lower-cased with the prefix
/// and the `_` delimiter stripped; values are kept verbatim. Variables that
/// consist of the prefix alone are skipped.
pub fn parse_env_overrides<I, K, V>(vars: I, prefix: &str) -> OverrideMap
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let prefix = format!("{}_", prefix.to_lowercase());
    let mut overrides = OverrideMap::new();

    for (key, value) in vars {
        let sanitized = key.as_ref().to_lowercase();
        let Some(name) = sanitized.strip_prefix(&prefix) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        trace!(variable = key.as_ref(), key = name, "environment override");
        overrides.insert(name.to_string(), value.into());
    }

    overrides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_variable_becomes_lowercase_key() {
        let vars = [("YAMLFIX_LINE_LENGTH", "100")];
        let overrides = parse_env_overrides(vars, "YAMLFIX");

        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["line_length"], "100");
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        let vars = [("yamlfix_explicit_start", "false"), ("YamlFix_Whitelines", "1")];
        let overrides = parse_env_overrides(vars, "YaMlFiX");

        assert_eq!(overrides["explicit_start"], "false");
        assert_eq!(overrides["whitelines"], "1");
    }

    #[test]
    fn test_value_kept_verbatim() {
        let vars = [("YAMLFIX_NONE_REPRESENTATION", "  Null ")];
        let overrides = parse_env_overrides(vars, "YAMLFIX");
        assert_eq!(overrides["none_representation"], "  Null ");
    }

    #[test]
    fn test_unrelated_variables_ignored() {
        let vars = [
            ("PATH", "/usr/bin"),
            ("YAMLFIXLINE_LENGTH", "1"),
            ("YAMLFIX_", "bare"),
            ("YAMLFIX", "bare"),
            ("OTHER_YAMLFIX_LINE_LENGTH", "2"),
        ];
        let overrides = parse_env_overrides(vars, "YAMLFIX");
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_custom_prefix() {
        let vars = [("MYFIX_LINE_LENGTH", "120"), ("YAMLFIX_LINE_LENGTH", "100")];
        let overrides = parse_env_overrides(vars, "myfix");

        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["line_length"], "120");
    }
}
