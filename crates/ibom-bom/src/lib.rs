//! Bill of materials for interactive BOM documents.
//!
//! Components placed on the board are filtered by [`BomConfig`], grouped by
//! value (compared through [`units::normalize`]), footprint and any extra
//! fields, and sorted into a stable table. Per-side tables are derived from
//! the combined one.

pub mod bom;
#[cfg(feature = "table")]
mod bom_table;
pub mod component;
pub mod config;
pub mod natural_string;
pub mod units;

pub use bom::{BomData, BomRow, build};
pub use component::{Attribute, Component};
pub use config::{BomConfig, ConfigError, Field, join_list, split_list};
pub use natural_string::NaturalString;
pub use units::{ComponentValue, DecimalSeparator, NormalizedValue, NormalizerConfig, Unit};
