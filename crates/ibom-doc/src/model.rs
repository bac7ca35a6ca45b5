use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Local};
use ibom_bom::BomData;
use ibom_geom::{DrawingItem, EdgesBbox, FootprintBbox, Pad, Point, Side};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::font::Glyph;

/// Decoded glyphs keyed by character.
pub type FontData = BTreeMap<char, Glyph>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: String,
    pub revision: String,
    pub company: String,
    pub date: String,
}

impl Metadata {
    /// Use the board file name for an empty title and its modification time
    /// for an empty date.
    pub fn fill_defaults(&mut self, pcb_file: &Path, modified: Option<DateTime<Local>>) {
        if self.title.is_empty()
            && let Some(stem) = pcb_file.file_stem()
        {
            self.title = stem.to_string_lossy().into_owned();
        }
        if self.date.is_empty()
            && let Some(modified) = modified
        {
            self.date = modified.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }
}

/// Drawings on the front and back copy of one layer pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerDrawings {
    #[serde(rename = "F", default)]
    pub front: Vec<DrawingItem>,
    #[serde(rename = "B", default)]
    pub back: Vec<DrawingItem>,
}

impl LayerDrawings {
    pub fn items(&self) -> impl Iterator<Item = &DrawingItem> {
        self.front.iter().chain(&self.back)
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut DrawingItem> {
        self.front.iter_mut().chain(&mut self.back)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Drawings {
    pub silkscreen: LayerDrawings,
    pub fabrication: LayerDrawings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintDrawing {
    pub layer: Side,
    pub drawing: DrawingItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<Point>,
    /// Derived from the pads when the adapter leaves it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<FootprintBbox>,
    #[serde(default)]
    pub pads: Vec<Pad>,
    #[serde(default)]
    pub drawings: Vec<FootprintDrawing>,
    pub layer: Side,
}

/// The canonical board document the viewer consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PcbData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges_bbox: Option<EdgesBbox>,
    #[serde(default)]
    pub edges: Vec<DrawingItem>,
    #[serde(default)]
    pub drawings: Drawings,
    #[serde(default, alias = "modules")]
    pub footprints: Vec<Footprint>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bom: Option<BomData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_data: Option<FontData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nets: Option<Value>,
}

impl PcbData {
    /// Every board-level and footprint-level drawing.
    pub fn drawing_items(&self) -> impl Iterator<Item = &DrawingItem> {
        self.edges
            .iter()
            .chain(self.drawings.silkscreen.items())
            .chain(self.drawings.fabrication.items())
            .chain(
                self.footprints
                    .iter()
                    .flat_map(|fp| fp.drawings.iter().map(|d| &d.drawing)),
            )
    }

    /// Keep only the drawings `keep` accepts, in every list.
    pub fn retain_drawings(&mut self, mut keep: impl FnMut(&DrawingItem) -> bool) {
        self.edges.retain(|item| keep(item));
        for layer in [&mut self.drawings.silkscreen, &mut self.drawings.fabrication] {
            layer.front.retain(|item| keep(item));
            layer.back.retain(|item| keep(item));
        }
        for footprint in &mut self.footprints {
            footprint.drawings.retain(|d| keep(&d.drawing));
        }
    }

    pub fn drawing_items_mut(&mut self) -> impl Iterator<Item = &mut DrawingItem> {
        self.edges
            .iter_mut()
            .chain(self.drawings.silkscreen.items_mut())
            .chain(self.drawings.fabrication.items_mut())
            .chain(
                self.footprints
                    .iter_mut()
                    .flat_map(|fp| fp.drawings.iter_mut().map(|d| &mut d.drawing)),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_modules_alias() {
        let pcbdata: PcbData = serde_json::from_str(
            r#"{"modules": [{"ref": "R1", "layer": "F", "pads": []}], "metadata": {"title": "x"}}"#,
        )
        .unwrap();
        assert_eq!(pcbdata.footprints.len(), 1);
        assert_eq!(pcbdata.footprints[0].reference, "R1");
        assert_eq!(pcbdata.metadata.revision, "");
    }

    #[test]
    fn test_metadata_defaults() {
        let mut metadata = Metadata {
            revision: "B".into(),
            ..Default::default()
        };
        let modified = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        metadata.fill_defaults(Path::new("boards/main.json"), Some(modified));
        assert_eq!(metadata.title, "main");
        assert_eq!(metadata.date, "2024-03-09 14:05:00");
        assert_eq!(metadata.revision, "B");
    }

    #[test]
    fn test_optional_layers_are_omitted() {
        let json = serde_json::to_value(PcbData::default()).unwrap();
        assert!(json.get("tracks").is_none());
        assert!(json.get("font_data").is_none());
        assert!(json.get("edges").is_some());
    }
}
