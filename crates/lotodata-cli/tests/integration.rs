//! Integration tests for the lotodata CLI
//!
//! These tests drive the commands against archives written to a temporary
//! directory and read the JSON output back.

use std::fs;
use std::path::Path;

use lotodata_cli::{build_command, convert_command, Manifest, Settings, MANIFEST_FILE};
use lotodata_xlsx::test_utils::XlsxBuilder;
use serde_json::{json, Value};
use tempfile::TempDir;

fn mega_sena() -> Vec<u8> {
    XlsxBuilder::new()
        .row(&["Concurso", "Data do Sorteio", "Bola1", "Bola2"])
        .row(&["1", "01/01/2024", "5", "10"])
        .row(&["2", "02/01/2024", "5", "20"])
        .build()
}

fn lotofacil() -> Vec<u8> {
    XlsxBuilder::new()
        .row(&["Concurso", "Data Sorteio", "Bola 1", "Bola 2", "Bola 3"])
        .row(&["3001", "10/01/2024", "1", "2", "3"])
        .build()
}

fn settings_for(root: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.paths.raw_dir = root.join("raw");
    settings.paths.out_dir = root.join("json");
    settings
}

fn write_archive(root: &Path, name: &str, bytes: &[u8]) {
    let raw = root.join("raw");
    fs::create_dir_all(&raw).unwrap();
    fs::write(raw.join(name), bytes).unwrap();
}

fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path).expect("Failed to read output");
    serde_json::from_str(&text).expect("Output is not valid JSON")
}

#[test]
fn test_build_writes_datasets_and_manifest() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    write_archive(root, "Mega-Sena.xlsx", &mega_sena());
    write_archive(root, "Lotofácil.xlsx", &lotofacil());
    fs::write(root.join("raw").join("README.txt"), "not an archive").unwrap();

    let manifest = build_command(&settings_for(root), None).expect("Build failed");

    let ids: Vec<&str> = manifest.datasets.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["lotofacil", "mega-sena"]);

    let mega = read_json(&root.join("json").join("mega-sena.json"));
    assert_eq!(mega["meta"]["game_name"], "Mega-Sena");
    assert_eq!(mega["meta"]["rows"], 2);
    assert_eq!(mega["stats"]["total_numbers"], 4);
    assert_eq!(mega["stats"]["number_counts"], json!({"5": 2, "10": 1, "20": 1}));
    assert_eq!(mega["last"], json!({"Concurso": "2", "Data do Sorteio": "02/01/2024"}));

    let lotofacil = read_json(&root.join("json").join("lotofacil.json"));
    assert_eq!(lotofacil["meta"]["source_file"], "Lotofácil.xlsx");
    assert_eq!(lotofacil["last"]["Data do Sorteio"], Value::Null);
    assert_eq!(lotofacil["draws"][0]["__numbers"], json!([1, 2, 3]));

    let on_disk: Manifest =
        serde_json::from_value(read_json(&root.join("json").join(MANIFEST_FILE))).unwrap();
    assert_eq!(on_disk, manifest);

    let entry = &on_disk.datasets[1];
    assert_eq!(entry.name, "Mega-Sena");
    assert_eq!(entry.path, "data/json/mega-sena.json");
    assert_eq!(entry.rows, 2);
    assert_eq!(entry.number_columns, vec!["Bola1", "Bola2"]);
}

#[test]
fn test_build_sequential_matches_parallel() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    write_archive(root, "Mega-Sena.xlsx", &mega_sena());
    write_archive(root, "Lotofácil.xlsx", &lotofacil());

    let parallel = build_command(&settings_for(root), Some(4)).unwrap();
    let sequential = build_command(&settings_for(root), Some(1)).unwrap();

    let strip = |m: &Manifest| -> Vec<(String, usize, Vec<String>)> {
        m.datasets
            .iter()
            .map(|d| (d.id.clone(), d.rows, d.number_columns.clone()))
            .collect()
    };
    assert_eq!(strip(&parallel), strip(&sequential));
}

#[test]
fn test_build_without_archives_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    fs::create_dir_all(root.join("raw")).unwrap();

    let err = build_command(&settings_for(root), None).unwrap_err();
    assert!(err.to_string().contains("No archives"));
    assert!(!root.join("json").join(MANIFEST_FILE).exists());
}

#[test]
fn test_build_stops_on_broken_archive() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    write_archive(root, "Mega-Sena.xlsx", &mega_sena());
    write_archive(root, "Quina.xlsx", b"this is not a zip file");

    let err = build_command(&settings_for(root), Some(1)).unwrap_err();

    assert!(format!("{:#}", err).contains("Quina.xlsx"));
    assert!(!root.join("json").join(MANIFEST_FILE).exists());
    assert!(!root.join("json").join("mega-sena.json").exists());
}

#[test]
fn test_build_with_custom_prefix_and_families() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    let bytes = XlsxBuilder::new()
        .row(&["Concurso", "Dezena 1", "Dezena 2"])
        .row(&["10", "11", "12"])
        .build();
    write_archive(root, "Super Sete.xlsx", &bytes);

    let mut settings = settings_for(root);
    settings.paths.public_prefix = "/static/".to_string();
    settings.dataset.number_families = vec!["Dezena".to_string()];

    let manifest = build_command(&settings, None).unwrap();

    assert_eq!(manifest.datasets[0].path, "/static/super-sete.json");
    assert_eq!(manifest.datasets[0].number_columns, vec!["Dezena 1", "Dezena 2"]);
    let data = read_json(&root.join("json").join("super-sete.json"));
    assert_eq!(data["stats"]["total_numbers"], 2);
}

#[test]
fn test_convert_to_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("Mega-Sena.xlsx");
    fs::write(&input, mega_sena()).unwrap();
    let output = temp_dir.path().join("out").join("mega.json");

    let dataset = convert_command(&input, Some(output.as_path()), &Settings::default()).unwrap();

    assert_eq!(dataset.meta.rows, 2);
    let json = read_json(&output);
    assert_eq!(json["draws"][1]["__numbers"], json!([5, 20]));

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("{\n  \"meta\""));
}

#[test]
fn test_convert_reports_missing_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("absent.xlsx");
    let output = temp_dir.path().join("out.json");

    let err = convert_command(&input, Some(output.as_path()), &Settings::default()).unwrap_err();

    assert!(err.to_string().contains("absent.xlsx"));
    assert!(!output.exists());
}
