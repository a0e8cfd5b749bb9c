//! Untyped configuration values as read from source files

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Key → value mapping merged from one or more config sources.
pub type RawMapping = BTreeMap<String, RawValue>;

/// A single configuration value before it is bound to a typed setting.
///
/// Deserializes from any TOML or YAML scalar, sequence or mapping. A YAML
/// null (`~` or a bare `key:`) becomes [`RawValue::Null`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<RawValue>),
    Table(RawMapping),
}

impl RawValue {
    pub fn as_table(&self) -> Option<&RawMapping> {
        match self {
            RawValue::Table(table) => Some(table),
            _ => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::String(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::String(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => write!(f, "null"),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Float(x) => write!(f, "{x}"),
            RawValue::String(s) => write!(f, "{s:?}"),
            RawValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            RawValue::Table(table) => {
                write!(f, "{{")?;
                for (i, (key, item)) in table.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key} = {item}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Merge `overlay` onto `base` key by key.
///
/// Nested tables merge recursively; any other value in `overlay` replaces
/// the value in `base`.
pub fn merge_mappings(base: &mut RawMapping, overlay: RawMapping) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(RawValue::Table(existing)), RawValue::Table(nested)) => {
                merge_mappings(existing, nested);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
