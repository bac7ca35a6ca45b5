use std::fmt;

use crate::component::{Attribute, Component};
use crate::config::BomConfig;
use crate::natural_string::NaturalString;

/// Variant value used for parts whose variant field is empty.
pub const EMPTY_VARIANT: &str = "<empty>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blacklisted,
    EmptyValue,
    Virtual,
    DoNotPopulate,
    Variant,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::Blacklisted => "blacklisted",
            SkipReason::EmptyValue => "empty value",
            SkipReason::Virtual => "virtual",
            SkipReason::DoNotPopulate => "do not populate",
            SkipReason::Variant => "excluded by board variant",
        };
        write!(f, "{text}")
    }
}

fn is_blacklisted(reference: &str, blacklist: &[String]) -> bool {
    let prefix = NaturalString::from(reference);
    let glob = format!("{}*", prefix.prefix());
    blacklist.iter().any(|entry| entry == reference || *entry == glob)
}

/// Why `component` stays out of the BOM, if it does.
pub fn skip_reason(component: &Component, config: &BomConfig) -> Option<SkipReason> {
    if is_blacklisted(&component.reference, &config.blacklist) {
        return Some(SkipReason::Blacklisted);
    }
    if config.blacklist_empty_val && matches!(component.value.as_str(), "" | "~") {
        return Some(SkipReason::EmptyValue);
    }
    if config.blacklist_virtual && component.attr == Attribute::Virtual {
        return Some(SkipReason::Virtual);
    }

    // Field based rules only apply to parts present in schematic data.
    if component.extra_fields.is_none() {
        return None;
    }

    if let Some(dnp) = &config.dnp_field
        && !component.field(dnp).is_empty()
    {
        return Some(SkipReason::DoNotPopulate);
    }

    if let Some(variant_field) = &config.board_variant_field {
        let variant = component.field(variant_field);
        if !config.board_variant_whitelist.is_empty() {
            let token = if variant.is_empty() { EMPTY_VARIANT } else { variant };
            if !config.board_variant_whitelist.iter().any(|v| v == token) {
                return Some(SkipReason::Variant);
            }
        }
        if !variant.is_empty() && config.board_variant_blacklist.iter().any(|v| v == variant) {
            return Some(SkipReason::Variant);
        }
    }

    None
}
