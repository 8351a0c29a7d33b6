use std::path::{Path, PathBuf};
use std::time::Duration;

use strokes2font::engine::{has_extension, is_os_hidden_file};
use strokes2font::error::ItemError;
use strokes2font::package::PackageConfig;
use strokes2font::pipeline::{
    OptimizeError, SVG_NAMESPACE_MARKER, SVG_NAMESPACE_NO_FILL, Substitute, Transform,
    optimize_svg,
};
use strokes2font::queue::{CompletionGate, OutcomeSignal};
use strokes2font::utils::{apply_file_to_opts, parse_settings_toml};
use strokes2font::{CompletionRecord, FailurePolicy, Item, Opts, StrokeMode};

fn run_substitute(sub: &mut Substitute, chunks: &[&str]) -> String {
    let mut out = Vec::new();
    for chunk in chunks {
        for piece in sub.transform(chunk.as_bytes().to_vec()).unwrap() {
            out.extend(piece);
        }
    }
    for piece in sub.finish().unwrap() {
        out.extend(piece);
    }
    String::from_utf8(out).unwrap()
}

fn record(id: &str, ok: bool) -> CompletionRecord {
    CompletionRecord {
        item: Item::new(id, Path::new("/src"), Path::new("/out")),
        result: if ok {
            Ok(())
        } else {
            Err(ItemError::Stage {
                stage: "test".to_string(),
                message: "boom".to_string(),
            })
        },
    }
}

// --- has_extension / is_os_hidden_file ---

#[test]
fn test_has_extension_matches_suffix() {
    assert!(has_extension("a.svg", "svg"));
    assert!(has_extension("icon.name.svg", ".svg"));
    assert!(!has_extension("a.svgz", "svg"));
    assert!(!has_extension("asvg", "svg"));
    assert!(!has_extension(".svg", "svg"));
    assert!(!has_extension("a.SVG", "svg"));
}

#[test]
fn test_is_os_hidden_file() {
    assert!(is_os_hidden_file(&PathBuf::from("/x/.DS_Store")));
    assert!(is_os_hidden_file(&PathBuf::from("/x/._a.svg")));
    assert!(!is_os_hidden_file(&PathBuf::from("/x/a.svg")));
}

// --- Item ---

#[test]
fn test_item_derives_paths() {
    let item = Item::new("a.svg", Path::new("/in"), Path::new("/tmp/out"));
    assert_eq!(item.id, "a.svg");
    assert_eq!(item.source, PathBuf::from("/in/a.svg"));
    assert_eq!(item.destination, PathBuf::from("/tmp/out/a.svg"));
}

// --- Substitute ---

#[test]
fn test_substitute_adds_fill_none() {
    let mut sub = Substitute::new(SVG_NAMESPACE_MARKER, SVG_NAMESPACE_NO_FILL).unwrap();
    let out = run_substitute(
        &mut sub,
        &[r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1 1"/>"#],
    );
    assert_eq!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" fill="none" viewBox="0 0 1 1"/>"#
    );
}

#[test]
fn test_substitute_marker_split_across_chunks() {
    let mut sub = Substitute::new("MARKER", "replaced").unwrap();
    let out = run_substitute(&mut sub, &["aaa MAR", "K", "ER bbb MARK", "ER"]);
    assert_eq!(out, "aaa replaced bbb replaced");
}

#[test]
fn test_substitute_no_match_is_passthrough() {
    let input = r#"<svg viewBox="0 0 1 1"><path d="M0 0"/></svg>"#;
    let mut sub = Substitute::new(SVG_NAMESPACE_MARKER, SVG_NAMESPACE_NO_FILL).unwrap();
    let out = run_substitute(&mut sub, &[&input[..10], &input[10..]]);
    assert_eq!(out, input);
}

#[test]
fn test_substitute_short_input_flushed_on_finish() {
    let mut sub = Substitute::new("MARKER", "x").unwrap();
    assert_eq!(run_substitute(&mut sub, &["MAR"]), "MAR");
}

#[test]
fn test_substitute_rejects_empty_marker() {
    assert!(Substitute::new("", "x").is_err());
}

// --- optimize_svg ---

#[test]
fn test_optimize_strips_prolog_comments_and_whitespace() {
    let doc = "<?xml version=\"1.0\"?>\n<!DOCTYPE svg>\n<!-- made by hand -->\n<svg viewBox=\"0 0 24 24\">\n  <path d=\"M0 0\"/>\n</svg>\n";
    assert_eq!(
        optimize_svg(doc).unwrap(),
        r#"<svg viewBox="0 0 24 24"><path d="M0 0"/></svg>"#
    );
}

#[test]
fn test_optimize_removes_editor_data() {
    let doc = r#"<svg xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" inkscape:version="1.2" sodipodi:docname="a.svg"><sodipodi:namedview id="base"/><metadata><rdf/></metadata><path d="M 0   0
L 1 1" inkscape:label="x"/></svg>"#;
    assert_eq!(
        optimize_svg(doc).unwrap(),
        r#"<svg><path d="M 0 0 L 1 1"/></svg>"#
    );
}

#[test]
fn test_optimize_removes_empty_containers_cascading() {
    let doc = r#"<svg><g><g><!-- nothing --></g></g><defs> </defs><path d="M0"/></svg>"#;
    assert_eq!(optimize_svg(doc).unwrap(), r#"<svg><path d="M0"/></svg>"#);
}

#[test]
fn test_optimize_keeps_text_whitespace_and_entities() {
    let doc = "<svg><text> a &amp;  b </text></svg>";
    assert_eq!(optimize_svg(doc).unwrap(), doc);
}

#[test]
fn test_optimize_escapes_quotes_from_single_quoted_values() {
    let doc = r#"<svg><path d='M0' data-x='a"b'/></svg>"#;
    let out = optimize_svg(doc).unwrap();
    assert_eq!(out, r#"<svg><path d="M0" data-x="a&quot;b"/></svg>"#);
    assert_eq!(optimize_svg(&out).unwrap(), out);
}

#[test]
fn test_optimize_is_idempotent() {
    let doc = "<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\" fill=\"none\">\n  <!-- c -->\n  <g transform=\" translate(1 ,  2) \">\n    <path d=\"M0 0\"/>text<g/>more\n  </g>\n  <style><![CDATA[ .a { fill: red } ]]></style>\n</svg>";
    let once = optimize_svg(doc).unwrap();
    let twice = optimize_svg(&once).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_optimize_rejects_mismatched_tags() {
    let err = optimize_svg("<svg><path></svg>").unwrap_err();
    assert!(matches!(err, OptimizeError::Malformed(_)), "{err:?}");
}

#[test]
fn test_optimize_rejects_unclosed_root() {
    let err = optimize_svg("<svg><path/>").unwrap_err();
    assert!(
        matches!(err, OptimizeError::Unclosed(_) | OptimizeError::Malformed(_)),
        "{err:?}"
    );
}

#[test]
fn test_optimize_rejects_non_documents() {
    assert_eq!(optimize_svg("").unwrap_err(), OptimizeError::NoRoot);
    assert_eq!(optimize_svg("  \n").unwrap_err(), OptimizeError::NoRoot);
    assert_eq!(optimize_svg("hello").unwrap_err(), OptimizeError::StrayText);
    assert_eq!(
        optimize_svg("<a/><b/>").unwrap_err(),
        OptimizeError::MultipleRoots
    );
}

// --- CompletionGate ---

#[test]
fn test_gate_zero_items_opens_on_seal() {
    let mut gate = CompletionGate::new();
    assert_eq!(gate.signal(), OutcomeSignal::Pending);
    let drained = gate.seal().expect("vacuous drain");
    assert!(drained.records.is_empty());
    assert_eq!(gate.signal(), OutcomeSignal::Drained);
    assert!(gate.seal().is_none());
}

#[test]
fn test_gate_opens_once_on_last_record() {
    let mut gate = CompletionGate::new();
    for _ in 0..3 {
        gate.expect_one();
    }
    assert!(gate.seal().is_none());
    assert_eq!(gate.signal(), OutcomeSignal::Draining);
    assert!(gate.record(record("a.svg", true)).is_none());
    assert!(gate.record(record("b.svg", false)).is_none());
    let drained = gate.record(record("c.svg", true)).expect("drained");
    assert_eq!(drained.records.len(), 3);
    assert_eq!(gate.signal(), OutcomeSignal::Drained);
    assert!(gate.record(record("d.svg", true)).is_none());
}

#[test]
fn test_gate_waits_for_seal() {
    let mut gate = CompletionGate::new();
    gate.expect_one();
    assert!(gate.record(record("a.svg", true)).is_none());
    assert!(gate.seal().is_some());
}

#[test]
fn test_gate_ignores_expectations_after_seal() {
    let mut gate = CompletionGate::new();
    gate.expect_one();
    assert!(gate.seal().is_none());
    gate.expect_one();
    assert_eq!(gate.expected(), 1);
    assert!(gate.record(record("a.svg", true)).is_some());
}

// --- Opts / settings ---

#[test]
fn test_opts_defaults() {
    let opts = Opts::default();
    assert_eq!(opts.destination, PathBuf::from("./dist/font"));
    assert_eq!(opts.concurrency, 1);
    assert_eq!(opts.extension, "svg");
    assert_eq!(opts.mode, StrokeMode::StrokeToPath);
    assert_eq!(opts.failure_policy, FailurePolicy::Proceed);
    assert!(opts.timeout.is_none());
}

#[test]
fn test_opts_validate() {
    let mut opts = Opts::default();
    assert!(opts.validate().is_err());
    opts.source = Some(PathBuf::from("icons"));
    assert_eq!(opts.validate().unwrap(), Path::new("icons"));
    opts.concurrency = 0;
    assert!(opts.validate().is_err());
    opts.concurrency = 2;
    opts.extension = ".".to_string();
    assert!(opts.validate().is_err());
}

#[test]
fn test_stroke_mode_actions() {
    assert!(StrokeMode::StrokeToPath.actions().contains("object-stroke-to-path"));
    assert!(
        StrokeMode::FillBetweenPaths
            .actions()
            .contains("path-fill-between-paths")
    );
}

#[test]
fn test_settings_toml_applies_to_opts() {
    let file = parse_settings_toml(
        r#"
[settings]
source = "icons"
concurrency = 4
mode = "fill-between-paths"
timeout_secs = 30
on_item_failure = "abort"

[package]
font_name = "glyphs"
font_height = 512

[package.website]
title = "Glyphs"
links = [{ title = "Repo", url = "https://example.com/repo" }]
"#,
    )
    .unwrap();
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.source, Some(PathBuf::from("icons")));
    assert_eq!(opts.concurrency, 4);
    assert_eq!(opts.mode, StrokeMode::FillBetweenPaths);
    assert_eq!(opts.timeout, Some(Duration::from_secs(30)));
    assert_eq!(opts.failure_policy, FailurePolicy::Abort);
    assert_eq!(opts.package.font_name, "glyphs");
    assert_eq!(opts.package.font_height, 512);
    assert!(opts.package.css);
    assert_eq!(opts.package.website.title, "Glyphs");
    assert_eq!(opts.package.website.links.len(), 1);
    // Untouched fields keep their defaults.
    assert_eq!(opts.destination, PathBuf::from("./dist/font"));
}

#[test]
fn test_settings_toml_rejects_unknown_keys() {
    assert!(parse_settings_toml("[settings]\nconcurency = 2\n").is_err());
    assert!(parse_settings_toml("[package]\nfontName = \"x\"\n").is_err());
}

// --- PackageConfig ---

#[test]
fn test_package_config_json_layout() {
    let config = PackageConfig::default();
    let json = config
        .to_packager_json(Path::new("/w/temp"), Path::new("/w/font"), Path::new("/w"))
        .unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["src"], "/w/temp");
    assert_eq!(v["dist"], "/w/font");
    assert_eq!(v["fontName"], "ids");
    assert_eq!(v["emptyDist"], true);
    assert_eq!(v["outSVGReact"], false);
    assert_eq!(v["useNameAsUnicode"], true);
    assert_eq!(v["css"], true);
    assert_eq!(v["svgicons2svgfont"]["normalize"], true);
    assert_eq!(v["svgicons2svgfont"]["fontHeight"], 1000);
    assert_eq!(v["website"]["title"], "ids");
    assert_eq!(v["website"]["logo"], "/w/svg/git.svg");
    assert_eq!(
        v["website"]["meta"]["keywords"],
        "svgtofont,TTF,EOT,WOFF,WOFF2,SVG"
    );
    assert!(v["website"].get("links").is_none());
    assert!(v["website"].get("backgroundColor").is_none());
}

// --- resolve_opts ---

#[test]
fn test_resolve_opts_layers_file_then_flags() {
    use clap::Parser;
    use strokes2font::engine::{Cli, resolve_opts};

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("strokes2font.toml"),
        "[settings]\nsource = \"from-file\"\nconcurrency = 3\nextension = \"svgx\"\n",
    )
    .unwrap();
    let cli = Cli::parse_from([
        "strokes2font",
        "--source",
        "icons",
        "--strict",
        "--keep-temp",
        "--mode",
        "fill-between-paths",
    ]);
    let opts = resolve_opts(&cli, dir.path()).unwrap();
    assert_eq!(opts.source, Some(dir.path().join("icons")));
    assert_eq!(opts.concurrency, 3);
    assert_eq!(opts.extension, "svgx");
    assert_eq!(opts.mode, StrokeMode::FillBetweenPaths);
    assert_eq!(opts.failure_policy, FailurePolicy::Abort);
    assert!(!opts.clean_temp);
    assert_eq!(opts.temp, dir.path().join("dist").join("temp"));
    assert_eq!(opts.packager.file_name().unwrap(), "svgtofont");
}
