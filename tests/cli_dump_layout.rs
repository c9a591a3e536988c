use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(prefix: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{nanos}.{ext}"))
}

fn barscape(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_barscape"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run barscape")
}

fn dump(args: &[&str]) -> Vec<serde_json::Value> {
    let output = barscape(args);
    assert!(
        output.status.success(),
        "barscape failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is a JSON array")
}

#[test]
fn dump_layout_emits_one_box_per_record() {
    let boxes = dump(&["--dump-layout"]);
    assert_eq!(boxes.len(), 24);

    let first = &boxes[0];
    assert_eq!(first["column"], 0);
    assert_eq!(first["row"], 0);
    assert_eq!(first["x"], 0.0);
    assert_eq!(first["z"], 0.0);
    assert_eq!(first["height"], 5.0);
    assert_eq!(first["width"], 2.0);
    assert_eq!(first["depth"], 1.0);
    assert_eq!(first["color"], 0xff6b6b);

    let last = &boxes[23];
    assert_eq!(last["column"], 3);
    assert_eq!(last["row"], 5);
    assert_eq!(last["x"], 6.0);
    assert_eq!(last["z"], 10.0);
    assert_eq!(last["color"], 0x51cf66);
}

#[test]
fn dump_layout_walks_columns_outermost() {
    let boxes = dump(&["--dump-layout"]);
    for (index, spec) in boxes.iter().enumerate() {
        assert_eq!(spec["column"], index / 6);
        assert_eq!(spec["row"], index % 6);
    }
}

#[test]
fn dump_layout_reads_a_fixture_file() {
    let path = temp_path("barscape_fixture", "json");
    let records: Vec<_> = (0..24)
        .map(|i| serde_json::json!({ "age": 10 * (i + 1), "race": 5 }))
        .collect();
    fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

    let boxes = dump(&["--dump-layout", "--fixture", path.to_str().unwrap()]);
    assert_eq!(boxes.len(), 24);
    assert_eq!(boxes[0]["height"], 1.0);
    assert_eq!(boxes[23]["height"], 24.0);
    assert!(boxes.iter().all(|b| b["width"] == 0.5));
    let _ = fs::remove_file(path);
}

#[test]
fn short_fixture_is_rejected() {
    let path = temp_path("barscape_short_fixture", "json");
    fs::write(&path, r#"[{ "age": 40, "race": 10 }]"#).unwrap();

    let output = barscape(&["--dump-layout", "--fixture", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("expected 24 records"),
        "unexpected stderr: {stderr}"
    );
    let _ = fs::remove_file(path);
}

#[test]
fn save_config_writes_effective_settings() {
    let path = temp_path("barscape_saved", "toml");
    let output = barscape(&[
        "--show-ground",
        "--resolution",
        "800x600",
        "--save-config",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let saved = fs::read_to_string(&path).expect("config written");
    assert!(saved.contains("show_ground = true"));
    assert!(saved.contains("width = 800"));
    let _ = fs::remove_file(path);
}

#[test]
fn headless_writes_a_png() {
    if std::env::var("BARSCAPE_RUN_GPU_TESTS").ok().as_deref() != Some("1") {
        eprintln!("skipping (set BARSCAPE_RUN_GPU_TESTS=1 to enable)");
        return;
    }

    let path = temp_path("barscape_headless", "png");
    let output = barscape(&[
        "--headless",
        "--resolution",
        "320x240",
        "--screenshot",
        path.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "headless render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let bytes = fs::read(&path).expect("png written");
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    let _ = fs::remove_file(path);
}

#[test]
fn oversized_grid_in_config_is_a_clean_error() {
    let path = temp_path("barscape_huge_grid", "toml");
    fs::write(
        &path,
        "[scene.grid]\ncolumns = 4611686018427387904\nrows = 4\n",
    )
    .unwrap();

    let output = barscape(&["--config", path.to_str().unwrap(), "--dump-layout"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("too large"), "unexpected stderr: {stderr}");
    assert!(!stderr.contains("panicked"), "unexpected stderr: {stderr}");
    let _ = fs::remove_file(path);
}
