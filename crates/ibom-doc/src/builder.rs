use ibom_bom::Component;
use ibom_diagnostics::{Diagnostics, WithDiagnostics};
use ibom_geom::BoundingBox;

use crate::config::Config;
use crate::font::{FontCache, StrokeFont};
use crate::model::PcbData;

const SOURCE: &str = "document";

/// Finishes an adapter's [`PcbData`] into the document the viewer loads.
pub struct DocumentBuilder<'a> {
    config: &'a Config,
    font: Option<&'a StrokeFont>,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config, font: None }
    }

    pub fn with_font(mut self, font: &'a StrokeFont) -> Self {
        self.font = Some(font);
        self
    }

    /// Drop unsupported drawings, normalize geometry, derive missing boxes,
    /// then attach the BOM and the font table. A board without any outline
    /// yields no output.
    pub fn build(&self, mut pcbdata: PcbData, components: &[Component]) -> WithDiagnostics<PcbData> {
        let mut diagnostics = Diagnostics::new();

        pcbdata.retain_drawings(|item| match item.unsupported_kind() {
            Some(kind) => {
                diagnostics.warn("geometry", format!("Unsupported shape {kind}, skipping"));
                false
            }
            None => true,
        });
        for item in pcbdata.drawing_items_mut() {
            item.normalize(&mut diagnostics);
        }
        for pad in pcbdata.footprints.iter_mut().flat_map(|fp| fp.pads.iter_mut()) {
            pad.normalize(&mut diagnostics);
        }

        if pcbdata.edges_bbox.is_none() {
            let mut bbox = BoundingBox::new();
            for edge in &pcbdata.edges {
                bbox.add_item(edge, &mut diagnostics);
            }
            match bbox.to_dict() {
                Some(edges_bbox) => pcbdata.edges_bbox = Some(edges_bbox),
                None => {
                    diagnostics.error(
                        SOURCE,
                        "Please draw pcb outline on the edges layer on sheet or any footprint \
                         before generating BOM.",
                    );
                    return WithDiagnostics::new(None, diagnostics);
                }
            }
        }

        self.fill_footprint_boxes(&mut pcbdata, &mut diagnostics);

        pcbdata.bom = Some(ibom_bom::build(
            components,
            &self.config.bom,
            &self.config.normalizer,
            &mut diagnostics,
        ));

        pcbdata.font_data = self.font_data(&pcbdata, &mut diagnostics);

        if !self.config.include_tracks {
            pcbdata.tracks = None;
            pcbdata.zones = None;
        }
        if !self.config.include_nets {
            pcbdata.nets = None;
        }

        log::info!(
            "Built document with {} footprints and {} BOM rows",
            pcbdata.footprints.len(),
            pcbdata.bom.as_ref().map_or(0, |bom| bom.both.len())
        );
        WithDiagnostics::new(Some(pcbdata), diagnostics)
    }

    fn fill_footprint_boxes(&self, pcbdata: &mut PcbData, diagnostics: &mut Diagnostics) {
        for footprint in pcbdata.footprints.iter_mut().filter(|fp| fp.bbox.is_none()) {
            let mut bbox = BoundingBox::new();
            for pad in &footprint.pads {
                bbox.add_pad(pad, diagnostics);
            }
            if !bbox.initialized() {
                let [x, y] = footprint.center.unwrap_or_default();
                diagnostics.warn(
                    SOURCE,
                    format!("Footprint {} has no pads, using an empty box", footprint.reference),
                );
                bbox.add_point(x, y);
            }
            footprint.bbox = bbox.to_component_dict();
        }
    }

    fn font_data(
        &self,
        pcbdata: &PcbData,
        diagnostics: &mut Diagnostics,
    ) -> Option<crate::model::FontData> {
        let mut texts = pcbdata
            .drawing_items()
            .filter_map(|item| item.as_text())
            .filter(|text| text.svgpath.is_none())
            .peekable();
        let Some(font) = self.font else {
            if texts.peek().is_some() {
                diagnostics.warn(
                    "font",
                    "No stroke font table given, text drawings will not render",
                );
            }
            return None;
        };
        let mut cache = FontCache::new(font);
        for text in texts {
            cache.add_string(&text.text);
        }
        log::debug!("Decoded {} glyphs", cache.len());
        Some(cache.into_font_data())
    }
}
