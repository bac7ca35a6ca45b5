use std::cmp::Ordering;
use std::collections::HashMap;

use ibom_diagnostics::Diagnostics;
use ibom_geom::Side;
use serde::{Deserialize, Serialize};

use crate::bom::filter::skip_reason;
use crate::component::{Attribute, Component};
use crate::config::{BomConfig, Field};
use crate::natural_string::NaturalString;
use crate::units::{NormalizerConfig, Unit, component_value, units_compatible};

const SOURCE: &str = "bom";

/// One line of the BOM: parts sharing value, footprint and group fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomRow {
    pub quantity: usize,
    /// Value text of the first part in the group.
    pub value: String,
    pub footprint: String,
    /// `(reference, component index)`, naturally ordered.
    pub refs: Vec<(NaturalString, usize)>,
    /// Values of the shown schematic fields, in configured order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_fields: Vec<String>,
}

impl BomRow {
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.refs.iter().map(|(r, _)| r.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BomData {
    pub both: Vec<BomRow>,
    #[serde(rename = "F")]
    pub front: Vec<BomRow>,
    #[serde(rename = "B")]
    pub back: Vec<BomRow>,
    /// Indices of components left out of the BOM.
    pub skipped: Vec<usize>,
    /// Names of the shown fields.
    pub fields: Vec<String>,
}

impl BomData {
    /// Rows for one side, or the combined table for `None`.
    pub fn rows(&self, side: Option<Side>) -> &[BomRow] {
        match side {
            None => &self.both,
            Some(Side::F) => &self.front,
            Some(Side::B) => &self.back,
        }
    }
}

/// Everything but the unit; units are matched loosely afterwards.
#[derive(Debug, PartialEq, Eq, Hash)]
struct GroupKey {
    value: Option<(bool, String)>,
    footprint: Option<String>,
    extras: Vec<String>,
    attr: Attribute,
}

struct Group {
    unit: Option<Unit>,
    value: String,
    footprint: String,
    sort_extras: Vec<String>,
    shown_extras: Vec<String>,
    refs: Vec<(NaturalString, usize)>,
}

fn field_values<'a>(component: &Component, fields: impl Iterator<Item = &'a Field>) -> Vec<String> {
    fields
        .filter_map(Field::extra_name)
        .map(|name| component.field(name).to_string())
        .collect()
}

fn compare_rows(a: &BomRow, a_extras: &[String], b: &BomRow, b_extras: &[String], config: &BomConfig) -> Ordering {
    let first = |row: &BomRow| row.refs.first().map(|(r, _)| r.clone());
    let prefix_index = |row: &BomRow| {
        row.refs
            .first()
            .map_or(usize::MAX, |(r, _)| config.sort_index(r.prefix()))
    };

    prefix_index(a)
        .cmp(&prefix_index(b))
        .then_with(|| a_extras.cmp(b_extras))
        .then_with(|| a.footprint.cmp(&b.footprint))
        .then_with(|| b.quantity.cmp(&a.quantity))
        .then_with(|| first(a).cmp(&first(b)))
}

fn filter_side(rows: &[BomRow], layers: &[Side], side: Side) -> Vec<BomRow> {
    rows.iter()
        .filter_map(|row| {
            let refs: Vec<_> = row
                .refs
                .iter()
                .filter(|(_, index)| layers[*index] == side)
                .cloned()
                .collect();
            (!refs.is_empty()).then(|| BomRow {
                quantity: refs.len(),
                refs,
                ..row.clone()
            })
        })
        .collect()
}

/// Group and sort `components` into BOM tables.
///
/// Values are compared through the normalizer so `4.7k` and `4700` land
/// in one row. A part whose unit is unknown joins the first earlier group
/// with the same magnitude, whatever that group's unit. A group started by
/// a unit-less part takes the unit of the first part with one that joins it.
pub fn build(
    components: &[Component],
    config: &BomConfig,
    normalizer: &NormalizerConfig,
    diagnostics: &mut Diagnostics,
) -> BomData {
    let group_by_value = config.group_fields.contains(&Field::Value);
    let group_by_footprint = config.group_fields.contains(&Field::Footprint);
    let reads_extra_data = config.uses_extra_data();

    let mut skipped = Vec::new();
    let mut groups: Vec<Group> = Vec::new();
    let mut buckets: HashMap<GroupKey, Vec<usize>> = HashMap::new();
    let mut missing_extra_data = false;

    for (index, component) in components.iter().enumerate() {
        if let Some(reason) = skip_reason(component, config) {
            log::debug!("Leaving {} out of the BOM: {reason}", component.reference);
            skipped.push(index);
            continue;
        }

        if reads_extra_data && component.extra_fields.is_none() {
            diagnostics.info(
                SOURCE,
                format!("Component {} is missing from schematic data.", component.reference),
            );
            missing_extra_data = true;
        }

        let value = component_value(&component.value, &component.reference, normalizer);
        let sort_extras = field_values(component, config.group_fields.iter());
        let key = GroupKey {
            value: group_by_value.then(|| (value.is_literal(), value.key().to_string())),
            footprint: group_by_footprint.then(|| component.footprint.clone()),
            extras: sort_extras.clone(),
            attr: component.attr,
        };
        let reference = (NaturalString::from(component.reference.as_str()), index);

        let bucket = buckets.entry(key).or_default();
        let unit = value.unit();
        match bucket
            .iter()
            .copied()
            .find(|g| !group_by_value || units_compatible(groups[*g].unit, unit))
        {
            Some(g) => {
                let group = &mut groups[g];
                group.unit = group.unit.or(unit);
                group.refs.push(reference);
            }
            None => {
                bucket.push(groups.len());
                groups.push(Group {
                    unit,
                    value: component.value.clone(),
                    footprint: component.footprint.clone(),
                    sort_extras,
                    shown_extras: field_values(component, config.show_fields.iter()),
                    refs: vec![reference],
                });
            }
        }
    }

    if missing_extra_data {
        diagnostics.warn(SOURCE, "Netlist/xml file is likely out of date.");
    }

    let mut rows: Vec<(BomRow, Vec<String>)> = groups
        .into_iter()
        .map(|mut group| {
            group.refs.sort();
            let row = BomRow {
                quantity: group.refs.len(),
                value: group.value,
                footprint: group.footprint,
                refs: group.refs,
                extra_fields: group.shown_extras,
            };
            (row, group.sort_extras)
        })
        .collect();
    rows.sort_by(|(a, a_extras), (b, b_extras)| compare_rows(a, a_extras, b, b_extras, config));
    let both: Vec<BomRow> = rows.into_iter().map(|(row, _)| row).collect();

    let layers: Vec<Side> = components.iter().map(|c| c.layer).collect();
    log::debug!(
        "BOM has {} rows for {} components, {} skipped",
        both.len(),
        components.len(),
        skipped.len()
    );

    BomData {
        front: filter_side(&both, &layers, Side::F),
        back: filter_side(&both, &layers, Side::B),
        both,
        skipped,
        fields: config.show_fields.iter().map(Field::to_string).collect(),
    }
}
