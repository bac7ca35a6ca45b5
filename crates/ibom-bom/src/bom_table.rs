use std::io::{self, Write};

use comfy_table::{Cell, CellAlignment, Table};
use ibom_geom::Side;

use crate::BomData;

impl BomData {
    /// Write one BOM table (combined for `None`) as a formatted table.
    pub fn write_table<W: Write>(&self, side: Option<Side>, mut writer: W) -> io::Result<()> {
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(comfy_table::ContentArrangement::DynamicFullWidth);

        let mut header = vec!["#".to_string(), "Qty".to_string(), "References".to_string()];
        header.extend(self.fields.iter().cloned());
        table.set_header(header);

        for (position, row) in self.rows(side).iter().enumerate() {
            let mut cells = vec![
                Cell::new(position + 1).set_alignment(CellAlignment::Right),
                Cell::new(row.quantity).set_alignment(CellAlignment::Right),
                Cell::new(row.references().collect::<Vec<_>>().join(",")),
            ];
            let mut extras = row.extra_fields.iter();
            for field in &self.fields {
                let text = match field.as_str() {
                    "Value" => row.value.as_str(),
                    "Footprint" => row.footprint.as_str(),
                    _ => extras.next().map_or("", String::as_str),
                };
                cells.push(Cell::new(text));
            }
            table.add_row(cells);
        }

        writeln!(writer, "{table}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ibom_diagnostics::Diagnostics;

    use crate::{BomConfig, Component, NormalizerConfig, build};
    use ibom_geom::Side;

    #[test]
    fn test_table_lists_rows_in_order() {
        let components = [
            Component::new("R2", "10k", "0402", Side::F),
            Component::new("C1", "100n", "0402", Side::B),
            Component::new("R1", "10k", "0402", Side::F),
        ];
        let bom = build(
            &components,
            &BomConfig::default(),
            &NormalizerConfig::default(),
            &mut Diagnostics::new(),
        );

        let mut out = Vec::new();
        bom.write_table(None, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("References"));
        let c1 = text.find("C1").unwrap();
        let r1 = text.find("R1,R2").unwrap();
        assert!(c1 < r1);

        let mut front = Vec::new();
        bom.write_table(Some(Side::F), &mut front).unwrap();
        assert!(!String::from_utf8(front).unwrap().contains("C1"));
    }
}
