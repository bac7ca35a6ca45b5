use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sort order entry that catches every prefix not listed explicitly.
pub const WILDCARD: &str = "~";

pub const DEFAULT_SORT_ORDER: [&str; 17] = [
    "C", "R", "L", "D", "U", "Y", "X", "F", "SW", "A", WILDCARD, "HS", "CNN", "J", "P", "NT", "MH",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("sort order contains more than one '~' entry")]
    DuplicateWildcard,

    #[error("group field '{field}' is not among the shown fields")]
    GroupFieldNotShown { field: String },

    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A BOM column: one of the two built-ins or a schematic field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Field {
    Value,
    Footprint,
    Extra(String),
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Value" => Field::Value,
            "Footprint" => Field::Footprint,
            _ => Field::Extra(name),
        }
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Field::from(name.to_string())
    }
}

impl From<Field> for String {
    fn from(field: Field) -> Self {
        field.to_string()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Value => write!(f, "Value"),
            Field::Footprint => write!(f, "Footprint"),
            Field::Extra(name) => write!(f, "{name}"),
        }
    }
}

impl Field {
    pub fn extra_name(&self) -> Option<&str> {
        match self {
            Field::Extra(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BomConfig {
    /// Reference prefixes in table order; [`WILDCARD`] places the rest.
    pub sort_order: Vec<String>,
    /// Exact references or `PREFIX*` globs to leave out.
    pub blacklist: Vec<String>,
    pub blacklist_virtual: bool,
    /// Leave out parts whose value is empty or `~`.
    pub blacklist_empty_val: bool,
    /// Parts with a non-empty value in this field are not populated.
    pub dnp_field: Option<String>,
    pub board_variant_field: Option<String>,
    pub board_variant_whitelist: Vec<String>,
    pub board_variant_blacklist: Vec<String>,
    pub show_fields: Vec<Field>,
    pub group_fields: Vec<Field>,
}

impl Default for BomConfig {
    fn default() -> Self {
        Self {
            sort_order: DEFAULT_SORT_ORDER.iter().map(|s| s.to_string()).collect(),
            blacklist: Vec::new(),
            blacklist_virtual: true,
            blacklist_empty_val: false,
            dnp_field: None,
            board_variant_field: None,
            board_variant_whitelist: Vec::new(),
            board_variant_blacklist: Vec::new(),
            show_fields: vec![Field::Value, Field::Footprint],
            group_fields: vec![Field::Value, Field::Footprint],
        }
    }
}

impl BomConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: BomConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Show and group by `Value`, `Footprint` and the given fields.
    pub fn with_extra_fields(mut self, fields: &[String]) -> Self {
        let mut all = vec![Field::Value, Field::Footprint];
        all.extend(fields.iter().map(|f| Field::from(f.as_str())));
        self.show_fields = all.clone();
        self.group_fields = all;
        self
    }

    /// Check invariants and append the wildcard to the sort order when
    /// missing. User order is otherwise left untouched.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        match self.sort_order.iter().filter(|s| *s == WILDCARD).count() {
            0 => self.sort_order.push(WILDCARD.to_string()),
            1 => {}
            _ => return Err(ConfigError::DuplicateWildcard),
        }
        if let Some(field) = self
            .group_fields
            .iter()
            .find(|f| !self.show_fields.contains(*f))
        {
            return Err(ConfigError::GroupFieldNotShown {
                field: field.to_string(),
            });
        }
        Ok(())
    }

    /// Schematic fields the BOM reads, used to detect parts that have no
    /// schematic data at all.
    pub fn uses_extra_data(&self) -> bool {
        self.show_fields.iter().any(|f| f.extra_name().is_some())
            || self.dnp_field.is_some()
            || self.board_variant_field.is_some()
    }

    /// Position of `prefix` in the sort order, falling back to the wildcard.
    pub fn sort_index(&self, prefix: &str) -> usize {
        self.sort_order
            .iter()
            .position(|p| p == prefix)
            .or_else(|| self.sort_order.iter().position(|p| p == WILDCARD))
            .unwrap_or(self.sort_order.len())
    }
}

/// Split a comma list. `\,` is a literal comma; empty items are dropped.
pub fn split_list(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                chars.next();
                current.push(',');
            }
            ',' => {
                if !current.is_empty() {
                    items.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        items.push(current);
    }
    items
}

pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| s.as_ref().replace(',', "\\,"))
        .collect::<Vec<_>>()
        .join(",")
}
