//! Loosely typed configuration values and the layers they are merged from.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key/value table of one configuration layer.
pub type ConfigTable = BTreeMap<String, ConfigValue>;

/// A configuration value. Deserializes from any TOML or JSON value except
/// TOML datetimes, JSON `null` and non-finite floats (`nan`, `inf`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    #[serde(deserialize_with = "finite_float")]
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
    Map(ConfigTable),
}

fn finite_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(format!("non-finite float {value}")))
    }
}

/// Kind of a [`ConfigValue`], compared when two layers declare the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Bool,
    Number,
    String,
    List,
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::List => "list",
            ValueKind::Map => "map",
        })
    }
}

impl ConfigValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::Bool(_) => ValueKind::Bool,
            ConfigValue::Integer(_) | ConfigValue::Float(_) => ValueKind::Number,
            ConfigValue::String(_) => ValueKind::String,
            ConfigValue::List(_) => ValueKind::List,
            ConfigValue::Map(_) => ValueKind::Map,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ConfigTable> {
        match self {
            ConfigValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(l) => Some(l),
            _ => None,
        }
    }

    /// Render a scalar as an environment variable value. Lists and maps have
    /// no scalar rendering.
    pub fn to_env_string(&self) -> Option<String> {
        match self {
            ConfigValue::Bool(b) => Some(b.to_string()),
            ConfigValue::Integer(i) => Some(i.to_string()),
            ConfigValue::Float(f) => Some(f.to_string()),
            ConfigValue::String(s) => Some(s.clone()),
            ConfigValue::List(_) | ConfigValue::Map(_) => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Float(f)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        ConfigValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<ConfigTable> for ConfigValue {
    fn from(table: ConfigTable) -> Self {
        ConfigValue::Map(table)
    }
}

/// Ordered pair of configuration tables: the shared base and the
/// system-specific overlay. Overlay keys take precedence when merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigLayer {
    pub base: ConfigTable,
    pub overlay: ConfigTable,
}

impl ConfigLayer {
    pub fn new(base: ConfigTable, overlay: ConfigTable) -> Self {
        Self { base, overlay }
    }
}

/// Parse a standalone TOML document into a configuration table.
pub fn parse_table_str(input: &str) -> Result<ConfigTable, toml::de::Error> {
    toml::from_str(input)
}
