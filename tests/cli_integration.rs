use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

/// A `dreamsecho` invocation against a private journal, with no network providers.
fn dreamsecho(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dreamsecho").unwrap();
    cmd.env("DREAMSECHO_HOME", home)
        .env("DREAMSECHO_ANALYZER", "keyword")
        .env("DREAMSECHO_IMAGE_GENERATOR", "disabled")
        .env_remove("OPENAI_API_KEY")
        .env_remove("DREAMSECHO_LOG");
    cmd
}

#[test]
fn test_add_then_list() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .args(["add", "--title", "Flying", "I", "was", "flying", "over", "the", "sea"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dream #1 saved: Flying"));

    dreamsecho(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Flying"))
        .stdout(predicate::str::contains("fantasy"));

    assert!(home.path().join("dreams.json").exists());
}

#[test]
fn test_naked_invocation_lists() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No dreams found."));
}

#[test]
fn test_add_reads_piped_stdin() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .args(["add", "--title", "Tides"])
        .write_stdin("The tide came in through the kitchen window.\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dream #1 saved: Tides"));

    dreamsecho(home.path())
        .args(["view", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kitchen window"));
}

#[test]
fn test_view_shows_analysis() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .args(["add", "--title", "Chase", "A monster was chasing me and I was terrified"])
        .assert()
        .success();

    dreamsecho(home.path())
        .args(["view", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Chase"))
        .stdout(predicate::str::contains("Analysis"))
        .stdout(predicate::str::contains("fear"));
}

#[test]
fn test_view_unknown_dream_fails() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .args(["view", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dream not found: #42"));
}

#[test]
fn test_blank_dream_is_rejected() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .args(["add", "   "])
        .assert()
        .failure();

    assert!(!home.path().join("dreams.json").exists());
}

#[test]
fn test_invalid_date_is_rejected() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .args(["add", "--date", "last tuesday", "A short dream"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_corrupt_journal_is_backed_up_and_add_continues() {
    let home = tempfile::tempdir().unwrap();
    let journal = home.path().join("dreams.json");
    std::fs::write(&journal, "{ this is not json").unwrap();

    dreamsecho(home.path())
        .args(["add", "--no-analysis", "Something new"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dreams.json.corrupt-"))
        .stdout(predicate::str::contains("Dream #1 saved"));

    let backups: Vec<_> = std::fs::read_dir(home.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("dreams.json.corrupt-")
        })
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        std::fs::read_to_string(backups[0].path()).unwrap(),
        "{ this is not json"
    );

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&journal).unwrap()).unwrap();
    assert_eq!(saved[0]["content"], "Something new");
}

#[test]
fn test_timestamp_in_clock_change_gap_loads() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join("dreams.json"),
        r#"[
  {"id": 1, "content": "Before the change", "created_at": "2024-03-01T07:00:00"},
  {"id": 2, "content": "In the skipped hour", "created_at": "2024-03-10T02:30:00"}
]"#,
    )
    .unwrap();

    let output = dreamsecho(home.path())
        .env("TZ", "America/New_York")
        .args(["--output", "json", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let dreams: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(dreams.as_array().unwrap().len(), 2);
    assert_eq!(dreams[0]["id"], 2);
    assert!(dreams[0]["created_at"]
        .as_str()
        .unwrap()
        .starts_with("2024-03-10T0"));
}

#[test]
fn test_stats_summarises_journal() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("No dreams recorded yet"));

    for (style, text) in [
        ("surreal", "Melting clocks in a desert"),
        ("surreal", "Stairs that go nowhere"),
        ("anime", "A giant robot in my garden"),
    ] {
        dreamsecho(home.path())
            .args(["add", "--no-analysis", "--style", style, text])
            .assert()
            .success();
    }

    dreamsecho(home.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dreams recorded"))
        .stdout(predicate::str::contains("surreal"));
}

#[test]
fn test_list_filters_by_style() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .args(["add", "--title", "Clocks", "--style", "surreal", "Melting clocks"])
        .assert()
        .success();
    dreamsecho(home.path())
        .args(["add", "--title", "Robot", "--style", "anime", "A giant robot"])
        .assert()
        .success();

    dreamsecho(home.path())
        .args(["list", "--style", "anime"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Robot"))
        .stdout(predicate::str::contains("Clocks").not());
}

#[test]
fn test_config_set_and_get() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .args(["config", "default_style", "watercolor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_style set to watercolor"));

    dreamsecho(home.path())
        .args(["config", "default_style"])
        .assert()
        .success()
        .stdout(predicate::str::contains("watercolor"));

    dreamsecho(home.path())
        .args(["add", "Painted rivers"])
        .assert()
        .success();

    dreamsecho(home.path())
        .args(["--output", "json", "view", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"style\": \"watercolor\""));
}

#[test]
fn test_config_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .args(["config", "colour", "blue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown config key: colour"));
}

#[test]
fn test_init_creates_directories() {
    let home = tempfile::tempdir().unwrap();
    let data_dir = home.path().join("journal");

    dreamsecho(&data_dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized dream journal"));

    assert!(data_dir.join("generated").is_dir());
}

#[test]
fn test_image_request_without_provider_still_saves() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .args(["add", "--image", "--no-analysis", "A lighthouse made of glass"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dream #1 saved"));

    dreamsecho(home.path())
        .args(["list", "--images"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No dreams found."));
}

#[test]
fn test_json_list_output() {
    let home = tempfile::tempdir().unwrap();

    dreamsecho(home.path())
        .args(["add", "--no-analysis", "--date", "2024-03-01", "An old dream"])
        .assert()
        .success();

    let output = dreamsecho(home.path())
        .args(["list", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let dreams: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let dreams = dreams.as_array().unwrap();
    assert_eq!(dreams.len(), 1);
    assert_eq!(dreams[0]["id"], 1);
    assert_eq!(dreams[0]["content"], "An old dream");
    assert!(dreams[0]["created_at"]
        .as_str()
        .unwrap()
        .starts_with("2024-03-01T00:00:00"));
}

#[test]
fn test_json_add_output_is_parseable() {
    let home = tempfile::tempdir().unwrap();

    let output = dreamsecho(home.path())
        .args(["--output", "json", "add", "--image", "A monster chased me"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let added: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(added[0]["id"], 1);
    assert_eq!(added[0]["content"], "A monster chased me");

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Dream #1 saved"));
    assert!(stderr.contains("Could not generate an illustration"));
    assert!(!stderr.contains('\u{1b}'));
}

#[test]
fn test_json_stats_on_empty_journal() {
    let home = tempfile::tempdir().unwrap();

    let output = dreamsecho(home.path())
        .args(["--output", "json", "stats"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(stats.is_null());
}

#[test]
fn test_unwritable_journal_fails() {
    let home = tempfile::tempdir().unwrap();
    let blocker = home.path().join("not-a-directory");
    std::fs::write(&blocker, "").unwrap();

    dreamsecho(&blocker.join("journal"))
        .args(["add", "--no-analysis", "Nowhere to go"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: IO error"));
}
