//! Reader for the generic JSON board format.
//!
//! ```json
//! { "_spec_version": 1, "pcbdata": { ... }, "components": [ ... ] }
//! ```
//!
//! `pcbdata` is already in canonical shape; `components` lists one entry
//! per footprint, in the same order.

use std::path::Path;

use ibom_bom::Component;
use serde_json::Value;

use crate::error::GenericJsonError;
use crate::model::PcbData;

pub const COMPATIBLE_SPEC_VERSIONS: &[u64] = &[1];

#[derive(Debug, Clone, PartialEq)]
pub struct GenericJson {
    pub pcbdata: PcbData,
    pub components: Vec<Component>,
}

fn array_len(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map_or(0, Vec::len)
}

pub fn parse_str(text: &str) -> Result<GenericJson, GenericJsonError> {
    let mut root: Value = serde_json::from_str(text)?;
    let Some(pcbdata) = root.get_mut("pcbdata").map(Value::take) else {
        return Err(GenericJsonError::MissingPcbData);
    };
    let Some(components) = root.get_mut("components").map(Value::take) else {
        return Err(GenericJsonError::MissingComponents);
    };

    let version = root.get("_spec_version").cloned().unwrap_or(Value::Null);
    if !version
        .as_u64()
        .is_some_and(|v| COMPATIBLE_SPEC_VERSIONS.contains(&v))
    {
        return Err(GenericJsonError::UnsupportedVersion(version.to_string()));
    }

    let footprints = array_len(pcbdata.get("footprints").or_else(|| pcbdata.get("modules")));
    let component_count = array_len(Some(&components));
    if footprints != component_count {
        return Err(GenericJsonError::CountMismatch {
            components: component_count,
            footprints,
        });
    }

    Ok(GenericJson {
        pcbdata: serde_json::from_value(pcbdata)?,
        components: serde_json::from_value(components)?,
    })
}

pub fn read(path: &Path) -> Result<GenericJson, GenericJsonError> {
    let text = std::fs::read_to_string(path).map_err(|source| GenericJsonError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_str(&text)?;
    log::info!("Successfully parsed {}", path.display());
    Ok(parsed)
}
