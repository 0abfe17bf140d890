use std::collections::BTreeMap;
use std::path::PathBuf;

use playbill::{Canvas, FontSpec, PosterDoc, Rgba8, StyleSheet, TextLine, Tier};

fn bin_path() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_playbill")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "playbill.exe"
            } else {
                "playbill"
            });
            p
        })
}

fn sample_doc() -> PosterDoc {
    let mut fonts = BTreeMap::new();
    fonts.insert(
        Tier::Body,
        FontSpec::new(vec![PathBuf::from("/no/such/font.ttf")], 24.0),
    );

    PosterDoc {
        style: StyleSheet {
            canvas: Canvas::new(320, 200),
            background: Rgba8::rgb(255, 255, 255),
            fonts,
            text_color: Rgba8::rgb(0, 0, 0),
            accent_color: Rgba8::rgb(220, 20, 60),
            line_pitch: 30.0,
            tier_pitch: BTreeMap::new(),
            start_offset: 30.0,
            left_margin: 20.0,
            highlight: playbill::HighlightRule::default(),
            decorations: vec![],
        },
        lines: vec![
            TextLine::left("모집 공고", Tier::Body),
            TextLine::left("2025-09-15", Tier::Body),
        ],
    }
}

#[test]
fn cli_render_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let doc_path = dir.join("poster.json");
    let out_path = dir.join("out.png");
    let _ = std::fs::remove_file(&out_path);

    let f = std::fs::File::create(&doc_path).unwrap();
    serde_json::to_writer_pretty(f, &sample_doc()).unwrap();

    let doc_arg = doc_path.to_string_lossy().to_string();
    let out_arg = out_path.to_string_lossy().to_string();

    let status = std::process::Command::new(bin_path())
        .args(["render", "--in", doc_arg.as_str(), "--out"])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
    assert_eq!(image::image_dimensions(&out_path).unwrap(), (320, 200));
}

#[test]
fn cli_fixtures_writes_only_the_named_scenario() {
    let dir = PathBuf::from("target").join("cli_smoke_fixtures");
    let _ = std::fs::remove_dir_all(&dir);

    let dir_arg = dir.to_string_lossy().to_string();
    let status = std::process::Command::new(bin_path())
        .args(["fixtures", "--out-dir", dir_arg.as_str(), "--only", "meeting"])
        .status()
        .unwrap();

    assert!(status.success());
    assert!(dir.join("test-meeting.png").exists());
    assert!(!dir.join("test-conference.png").exists());
}

#[test]
fn cli_rejects_unknown_scenario() {
    let dir = PathBuf::from("target").join("cli_smoke_unknown");
    let dir_arg = dir.to_string_lossy().to_string();

    let status = std::process::Command::new(bin_path())
        .args(["fixtures", "--out-dir", dir_arg.as_str(), "--only", "banquet"])
        .status()
        .unwrap();

    assert!(!status.success());
}
