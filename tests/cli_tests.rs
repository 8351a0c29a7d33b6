//! CLI integration tests for strokes2font: argument parsing, config files and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn cmd(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("strokes2font").unwrap();
    cmd.current_dir(cwd)
        .env_remove("STROKES2FONT_INKSCAPE")
        .env_remove("STROKES2FONT_PACKAGER");
    cmd
}

#[test]
fn test_help_lists_options() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--source"))
        .stdout(predicate::str::contains("--concurrency"))
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--strict"));
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("strokes2font"));
}

#[test]
fn test_missing_source_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no source directory"));
}

#[test]
fn test_zero_concurrency_rejected() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .args(["--source", "icons", "--concurrency", "0"])
        .assert()
        .failure();
}

#[test]
fn test_unknown_mode_rejected() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .args(["--source", "icons", "--mode", "outline"])
        .assert()
        .failure();
}

#[test]
fn test_bad_config_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("strokes2font.toml"),
        "[settings]\nsource = \"icons\"\nworkers = 4\n",
    )
    .unwrap();
    cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("strokes2font.toml"));
}

#[test]
fn test_explicit_config_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .args(["--config", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.toml"));
}

#[cfg(unix)]
mod end_to_end {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M2 2 L22 22"/></svg>"#;

    fn script(path: &Path, body: &str) {
        fs::write(path, body).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Source dir with two icons, a stand-in vector tool and a packager that lists its input.
    fn workspace(root: &Path) {
        fs::create_dir_all(root.join("icons")).unwrap();
        fs::write(root.join("icons").join("a.svg"), ICON).unwrap();
        fs::write(root.join("icons").join("b.svg"), "<svg>FAIL</svg>").unwrap();
        script(
            &root.join("tool"),
            "#!/bin/sh\ninput=$(cat)\ncase \"$input\" in *FAIL*) exit 1 ;; esac\nprintf '%s' \"$input\"\n",
        );
        script(
            &root.join("packager"),
            "#!/bin/sh\nmkdir -p \"$4\"\nls \"$2\" > \"$4/glyphs.txt\"\n",
        );
    }

    #[test]
    fn test_run_packages_successful_files() {
        let dir = tempfile::tempdir().unwrap();
        workspace(dir.path());
        cmd(dir.path())
            .args(["--source", "icons", "--inkscape", "./tool", "--packager", "./packager"])
            .assert()
            .success();
        let glyphs = fs::read_to_string(dir.path().join("dist/font/glyphs.txt")).unwrap();
        assert_eq!(glyphs.trim(), "a.svg");
        assert!(dir.path().join("dist/.svgtofontrc").is_file());
    }

    #[test]
    fn test_strict_run_fails_without_packaging() {
        let dir = tempfile::tempdir().unwrap();
        workspace(dir.path());
        cmd(dir.path())
            .args([
                "--source",
                "icons",
                "--inkscape",
                "./tool",
                "--packager",
                "./packager",
                "--strict",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("packaging skipped"));
        assert!(!dir.path().join("dist/font/glyphs.txt").exists());
    }

    #[test]
    fn test_settings_file_supplies_options() {
        let dir = tempfile::tempdir().unwrap();
        workspace(dir.path());
        fs::remove_file(dir.path().join("icons").join("b.svg")).unwrap();
        fs::write(
            dir.path().join("strokes2font.toml"),
            "[settings]\nsource = \"icons\"\ninkscape = \"./tool\"\npackager = \"./packager\"\ndestination = \"out\"\n",
        )
        .unwrap();
        cmd(dir.path()).assert().success();
        let glyphs = fs::read_to_string(dir.path().join("out/glyphs.txt")).unwrap();
        assert_eq!(glyphs.trim(), "a.svg");
    }
}
