use std::collections::BTreeMap;
use std::fmt;

use ibom_geom::Side;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[default]
    Normal,
    #[serde(rename = "Normal+Insert")]
    NormalInsert,
    Virtual,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Normal => write!(f, "Normal"),
            Attribute::NormalInsert => write!(f, "Normal+Insert"),
            Attribute::Virtual => write!(f, "Virtual"),
        }
    }
}

/// A placed part as handed over by a board adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "val", alias = "value", default)]
    pub value: String,
    #[serde(default)]
    pub footprint: String,
    pub layer: Side,
    #[serde(default)]
    pub attr: Attribute,
    /// Schematic fields; `None` when the part is missing from schematic data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_fields: Option<BTreeMap<String, String>>,
}

impl Component {
    pub fn new(
        reference: impl Into<String>,
        value: impl Into<String>,
        footprint: impl Into<String>,
        layer: Side,
    ) -> Self {
        Self {
            reference: reference.into(),
            value: value.into(),
            footprint: footprint.into(),
            layer,
            attr: Attribute::Normal,
            extra_fields: None,
        }
    }

    pub fn with_attr(mut self, attr: Attribute) -> Self {
        self.attr = attr;
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_fields
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Extra field value, empty when absent.
    pub fn field(&self, name: &str) -> &str {
        self.extra_fields
            .as_ref()
            .and_then(|fields| fields.get(name))
            .map_or("", String::as_str)
    }
}
