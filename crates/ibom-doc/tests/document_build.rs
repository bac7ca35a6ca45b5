use ibom_bom::Component;
use ibom_doc::{Config, DocumentBuilder, PcbData, StrokeFont, generic_json, payload};
use ibom_geom::{EdgesBbox, Side};
use serde_json::json;

fn board() -> (PcbData, Vec<Component>) {
    let input = json!({
        "_spec_version": 1,
        "pcbdata": {
            "edges": [
                {"type": "segment", "start": [0, 0], "end": [40, 0], "width": 0},
                {"type": "segment", "start": [40, 0], "end": [40, 30], "width": 0},
                {"type": "segment", "start": [40, 30], "end": [0, 30], "width": 0},
                {"type": "segment", "start": [0, 30], "end": [0, 0], "width": 0}
            ],
            "drawings": {
                "silkscreen": {
                    "F": [{"pos": [5, 5], "text": "R1", "height": 1, "width": 1, "thickness": 0.15, "ref": 1}],
                    "B": []
                },
                "fabrication": {"F": [], "B": []}
            },
            "footprints": [
                {"ref": "R1", "layer": "F", "pads": [
                    {"layers": ["F"], "pos": [10, 10], "size": [1, 2], "shape": "rect", "type": "smd"}
                ]},
                {"ref": "R2", "layer": "F", "pads": [
                    {"layers": ["F"], "pos": [20, 10], "size": [1, 1], "shape": "circle", "type": "smd"}
                ]},
                {"ref": "C1", "layer": "B", "pads": []}
            ],
            "metadata": {"title": "demo", "revision": "A", "company": "", "date": ""},
            "tracks": {"F": [], "B": []},
            "nets": ["GND"]
        },
        "components": [
            {"ref": "R1", "val": "4.7k", "footprint": "0402", "layer": "F"},
            {"ref": "R2", "val": "4700", "footprint": "0402", "layer": "F"},
            {"ref": "C1", "val": "0.1uF", "footprint": "0402", "layer": "B"}
        ]
    });
    let parsed = generic_json::parse_str(&input.to_string()).unwrap();
    (parsed.pcbdata, parsed.components)
}

fn font() -> StrokeFont {
    let mut glyphs = vec!["JZ".to_string(); 95];
    glyphs['1' as usize - ' ' as usize] = "MWRYRF".to_string();
    glyphs['R' as usize - ' ' as usize] = "KYOFOY RO[".to_string();
    StrokeFont::new(glyphs)
}

#[test]
fn builds_complete_document() {
    let (pcbdata, components) = board();
    let config = Config::default();
    let font = font();
    let result = DocumentBuilder::new(&config)
        .with_font(&font)
        .build(pcbdata, &components);
    assert!(result.is_success(), "{}", result.diagnostics);

    let (document, diagnostics) = result.unpack();
    let document = document.unwrap();
    assert_eq!(
        document.edges_bbox,
        Some(EdgesBbox {
            minx: 0.0,
            miny: 0.0,
            maxx: 40.0,
            maxy: 30.0
        })
    );

    let r1 = document.footprints[0].bbox.unwrap();
    assert_eq!(r1.pos, [9.5, 9.0]);
    assert_eq!(r1.size, [1.0, 2.0]);
    assert_eq!(document.footprints[2].bbox.unwrap().size, [0.0, 0.0]);
    assert_eq!(diagnostics.warnings().len(), 1, "{diagnostics}");

    let bom = document.bom.as_ref().unwrap();
    let both: Vec<Vec<&str>> = bom.both.iter().map(|row| row.references().collect()).collect();
    assert_eq!(both, [vec!["C1"], vec!["R1", "R2"]]);
    assert_eq!(bom.rows(Some(Side::B)).len(), 1);
    assert_eq!(bom.rows(Some(Side::F))[0].quantity, 2);

    let font_data = document.font_data.as_ref().unwrap();
    assert_eq!(font_data.keys().copied().collect::<String>(), "1R");

    assert!(document.tracks.is_none());
    assert!(document.nets.is_none());
}

#[test]
fn keeps_optional_layers_when_asked() {
    let (pcbdata, components) = board();
    let config = Config {
        include_tracks: true,
        include_nets: true,
        ..Default::default()
    };
    let document = DocumentBuilder::new(&config)
        .build(pcbdata, &components)
        .output_result()
        .unwrap();
    assert_eq!(document.nets, Some(json!(["GND"])));
    assert!(document.tracks.is_some());
    assert!(document.font_data.is_none());
}

#[test]
fn missing_font_is_reported() {
    let (pcbdata, components) = board();
    let config = Config::default();
    let result = DocumentBuilder::new(&config).build(pcbdata, &components);
    assert!(
        result
            .diagnostics
            .warnings()
            .iter()
            .any(|d| d.source == "font")
    );
}

#[test]
fn board_without_outline_fails() {
    let (mut pcbdata, components) = board();
    pcbdata.edges.clear();
    let config = Config::default();
    let result = DocumentBuilder::new(&config).build(pcbdata, &components);
    assert!(!result.is_success());
    let errors = result.diagnostics.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].body.starts_with("Please draw pcb outline on the edges layer"));
}

#[test]
fn given_outline_is_kept() {
    let (mut pcbdata, components) = board();
    pcbdata.edges.clear();
    pcbdata.edges_bbox = Some(EdgesBbox {
        minx: -1.0,
        miny: -1.0,
        maxx: 1.0,
        maxy: 1.0,
    });
    let config = Config::default();
    let result = DocumentBuilder::new(&config).build(pcbdata, &components);
    assert!(result.is_success());
}

#[test]
fn compressed_payload_round_trip() {
    let (pcbdata, components) = board();
    let config = Config::default();
    let font = font();
    let document = DocumentBuilder::new(&config)
        .with_font(&font)
        .build(pcbdata, &components)
        .output_result()
        .unwrap();

    let script = payload::serialize(&document, config.compression).unwrap();
    assert!(!script.contains("\"edges\""));
    assert_eq!(payload::deserialize(&script).unwrap(), document);
}

#[test]
fn unsupported_drawings_are_skipped_and_reported() {
    let (mut pcbdata, components) = board();
    pcbdata.edges = serde_json::from_value(json!([
        {"type": "segment", "start": [50, 50], "end": [60, 50], "width": 0},
        {"type": "segment", "start": [60, 50], "end": [60, 60], "width": 0},
        {"type": "ellipse", "start": [55, 55], "radius": 1},
        {"type": "segment", "start": [0, 0], "end": [5, 5]}
    ]))
    .unwrap();
    pcbdata.footprints[0].drawings = serde_json::from_value(json!([
        {"layer": "F", "drawing": {"type": "oval", "start": [0, 0]}},
        {"layer": "F", "drawing": {"type": "circle", "start": [10, 10], "radius": 1, "width": 0.1}}
    ]))
    .unwrap();
    let config = Config::default();
    let font = font();
    let result = DocumentBuilder::new(&config)
        .with_font(&font)
        .build(pcbdata, &components);
    assert!(result.is_success(), "{}", result.diagnostics);

    let (document, diagnostics) = result.unpack();
    let document = document.unwrap();
    assert_eq!(
        document.edges_bbox,
        Some(EdgesBbox {
            minx: 50.0,
            miny: 50.0,
            maxx: 60.0,
            maxy: 60.0
        })
    );
    assert_eq!(document.edges.len(), 2);
    assert_eq!(document.footprints[0].drawings.len(), 1);

    let skipped: Vec<String> = diagnostics
        .warnings()
        .into_iter()
        .filter(|d| d.source == "geometry")
        .map(|d| d.body)
        .collect();
    assert_eq!(
        skipped,
        [
            "Unsupported shape 'ellipse', skipping",
            "Unsupported shape 'segment', skipping",
            "Unsupported shape 'oval', skipping",
        ]
    );
    assert!(diagnostics.iter().all(|d| d.source != "font"), "{diagnostics}");
}
