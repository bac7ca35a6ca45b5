use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;

const BOARD: &str = r#"{
    "_spec_version": 1,
    "pcbdata": {
        "edges": [
            {"type": "rect", "start": [0, 0], "end": [30, 20], "width": 0.1}
        ],
        "footprints": [
            {"ref": "R10", "layer": "F", "pads": [
                {"layers": ["F"], "pos": [5, 5], "size": [1, 1], "shape": "rect", "type": "smd"}
            ]},
            {"ref": "R9", "layer": "F", "pads": [
                {"layers": ["F"], "pos": [8, 5], "size": [1, 1], "shape": "rect", "type": "smd"}
            ]},
            {"ref": "U1", "layer": "B", "pads": [
                {"layers": ["B"], "pos": [15, 10], "size": [2, 2], "shape": "rect", "type": "smd"}
            ]},
            {"ref": "C1", "layer": "F", "pads": [
                {"layers": ["F"], "pos": [20, 5], "size": [1, 1], "shape": "rect", "type": "smd"}
            ]}
        ],
        "metadata": {"title": "Demo", "revision": "B", "company": "ACME", "date": "2024-01-02"}
    },
    "components": [
        {"ref": "R10", "val": "4.7k", "footprint": "0402", "layer": "F"},
        {"ref": "R9", "val": "4700", "footprint": "0402", "layer": "F"},
        {"ref": "U1", "val": "MCU", "footprint": "QFN-32", "layer": "B"},
        {"ref": "C1", "val": "100nF", "footprint": "0402", "layer": "F"}
    ]
}"#;

fn ibom() -> Command {
    let mut cmd = Command::cargo_bin("ibom").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn generate_writes_compressed_payload() {
    let dir = TempDir::new().unwrap();
    let board = dir.child("demo.json");
    board.write_str(BOARD).unwrap();

    let stdout = stdout_of(ibom().arg("generate").arg(board.path()).args(["--name-format", "%f-%r"]));
    assert!(stdout.contains("demo-B.js"), "{stdout}");

    let script = std::fs::read_to_string(dir.child("bom/demo-B.js").path()).unwrap();
    let packed = script
        .trim_end()
        .strip_prefix("var pcbdata = JSON.parse(LZString.decompressFromBase64(\"")
        .and_then(|rest| rest.strip_suffix("\"))"))
        .unwrap();
    let json = ibom_lzstring::decompress_from_base64(packed).unwrap();
    let document: serde_json::Value = serde_json::from_str(&json).unwrap();
    let maxx = document["edges_bbox"]["maxx"].as_f64().unwrap();
    assert!((maxx - 30.05).abs() < 1e-9, "{maxx}");
    assert_eq!(document["bom"]["both"].as_array().unwrap().len(), 3);
    assert_eq!(document["metadata"]["title"], "Demo");
}

#[test]
fn generate_plain_payload_with_config_file() {
    let dir = TempDir::new().unwrap();
    dir.child("board.json").write_str(BOARD).unwrap();
    dir.child("ibom.toml")
        .write_str("compression = false\nbom_dest_dir = \"out\"\n")
        .unwrap();

    ibom()
        .arg("generate")
        .arg(dir.child("board.json").path())
        .assert()
        .success();

    let script = std::fs::read_to_string(dir.child("out/ibom.js").path()).unwrap();
    assert!(script.starts_with("var pcbdata = {"), "{script}");
}

#[test]
fn bom_table_is_naturally_sorted() {
    let dir = TempDir::new().unwrap();
    let board = dir.child("board.json");
    board.write_str(BOARD).unwrap();

    let stdout = stdout_of(ibom().arg("bom").arg(board.path()));
    let c1 = stdout.find("C1").unwrap();
    let rows = stdout.find("R9,R10").unwrap();
    let u1 = stdout.find("U1").unwrap();
    assert!(c1 < rows && rows < u1, "{stdout}");
}

#[test]
fn bom_json_for_one_side() {
    let dir = TempDir::new().unwrap();
    let board = dir.child("board.json");
    board.write_str(BOARD).unwrap();

    let stdout = stdout_of(
        ibom()
            .arg("bom")
            .arg(board.path())
            .args(["--layer", "B", "--format", "json"]),
    );
    let rows: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["refs"][0][0], "U1");
    assert_eq!(rows[0]["quantity"], 1);
}

#[test]
fn bom_respects_sort_order_and_blacklist() {
    let dir = TempDir::new().unwrap();
    let board = dir.child("board.json");
    board.write_str(BOARD).unwrap();

    let stdout = stdout_of(ibom().arg("bom").arg(board.path()).args([
        "--format",
        "json",
        "--sort-order",
        "U,R",
        "--blacklist",
        "C*",
    ]));
    let rows: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let first_refs: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["refs"][0][0].as_str().unwrap())
        .collect();
    assert_eq!(first_refs, ["U1", "R9"]);
}

#[test]
fn invalid_board_fails() {
    let dir = TempDir::new().unwrap();
    let board = dir.child("board.json");
    board
        .write_str(r#"{"_spec_version": 3, "pcbdata": {}, "components": []}"#)
        .unwrap();

    let output = ibom().arg("generate").arg(board.path()).assert().failure();
    let stderr = String::from_utf8(output.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("unsupported spec version (3)"), "{stderr}");
}

#[test]
fn board_without_outline_fails() {
    let dir = TempDir::new().unwrap();
    let board = dir.child("board.json");
    board
        .write_str(BOARD.replace(r#"{"type": "rect", "start": [0, 0], "end": [30, 20], "width": 0.1}"#, "").as_str())
        .unwrap();

    let output = ibom().arg("generate").arg(board.path()).assert().failure();
    let stderr = String::from_utf8(output.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("Please draw pcb outline"), "{stderr}");
}
