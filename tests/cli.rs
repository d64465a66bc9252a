use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn scraper() -> Command {
    let mut cmd = Command::cargo_bin("transcript-scraper").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn formats_lists_every_export_format() {
    scraper()
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("json"))
        .stdout(predicate::str::contains(".csv"))
        .stdout(predicate::str::contains(".xml"))
        .stdout(predicate::str::contains(".html"))
        .stdout(predicate::str::contains(".rss"));
}

#[test]
fn resolve_prints_ids_and_failures() {
    scraper()
        .args([
            "resolve",
            "dQw4w9WgXcQ",
            "https://youtu.be/abc123",
            "https://www.youtube.com/shorts/short000001",
            "not a url",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("dQw4w9WgXcQ -> dQw4w9WgXcQ"))
        .stdout(predicate::str::contains("https://youtu.be/abc123 -> abc123"))
        .stdout(predicate::str::contains("-> short000001"))
        .stdout(predicate::str::contains("not a url -> not a video id or URL"));
}

#[test]
fn resolve_fails_when_nothing_resolves() {
    scraper()
        .args(["resolve", "https://vimeo.com/1"])
        .assert()
        .failure();
}

#[test]
fn scrape_fails_on_empty_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.json");
    std::fs::write(&input, "[]").unwrap();

    scraper()
        .current_dir(dir.path())
        .args(["--quiet", "scrape", "--input"])
        .arg(&input)
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No references found"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn scrape_fails_when_no_reference_resolves() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.json");
    std::fs::write(&input, r#"{"urls": ["not a url", {"url": "https://vimeo.com/1"}]}"#).unwrap();

    scraper()
        .current_dir(dir.path())
        .args(["--quiet", "scrape", "--input"])
        .arg(&input)
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No records to export"));
}

#[test]
fn scrape_fails_on_missing_input_file() {
    let dir = TempDir::new().unwrap();

    scraper()
        .current_dir(dir.path())
        .args(["--quiet", "scrape", "--input", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input URL file not found"));
}

#[test]
fn config_init_writes_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.yaml");

    scraper()
        .args(["config", "--init", "--config"])
        .arg(&path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("output_base_name: youtube_transcripts"));

    scraper()
        .args(["config", "--show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output Formats: json"));
}
