/// CLI binary integration tests using assert_cmd
///
/// These tests run the binary against a SQLite fixture; nothing reaches the network.
mod common;

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CONNECTION_VARS: [&str; 9] = [
    "MYSQL_HOST",
    "MYSQL_USER",
    "MYSQL_PASSWORD",
    "MYSQL_DATABASE",
    "EC2_HOSTNAME",
    "EC2_USERNAME",
    "EC2_PRIVATE_KEY",
    "EC2_PRIVATE_KEY_PATH",
    "EC2_PORT",
];

/// Binary with an isolated HOME and none of the connection variables set.
fn castsearch(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_castsearch"));
    cmd.env("HOME", home)
        .env_remove("CASTSEARCH_FIXTURE")
        .env_remove("CASTSEARCH_GENRES")
        .env_remove("RUST_LOG");
    for var in CONNECTION_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// Temp HOME holding a demo fixture at `demo.db`.
fn demo_home() -> TempDir {
    let home = TempDir::new().unwrap();
    castsearch(home.path())
        .arg("init-fixture")
        .arg(home.path().join("demo.db"))
        .arg("--demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("with sample data"));
    home
}

#[test]
fn test_cli_help_lists_commands() {
    let home = TempDir::new().unwrap();
    castsearch(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("browse"))
        .stdout(predicate::str::contains("init-fixture"));
}

#[test]
fn test_cli_search_against_fixture() {
    let home = demo_home();
    castsearch(home.path())
        .arg("--fixture")
        .arg(home.path().join("demo.db"))
        .arg("search")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 projects"))
        .stdout(predicate::str::contains("Autumn Tea CM"))
        .stdout(predicate::str::contains("テスト案件").not())
        .stdout(predicate::str::contains("Other Team Project").not());
}

#[test]
fn test_cli_search_with_criteria_from_environment_fixture() {
    let home = demo_home();
    castsearch(home.path())
        .env("CASTSEARCH_FIXTURE", home.path().join("demo.db"))
        .args(["search", "--talent", "青井", "--from", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 project:"))
        .stdout(predicate::str::contains("春の新商品キャンペーン"));
}

#[test]
fn test_cli_search_no_match_warns() {
    let home = demo_home();
    castsearch(home.path())
        .arg("--fixture")
        .arg(home.path().join("demo.db"))
        .args(["search", "--project", "autumn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects found."))
        .stderr(predicate::str::contains("No projects match"));
}

#[test]
fn test_cli_search_json_output() {
    let home = demo_home();
    let genres = home.path().join("genres.json");
    std::fs::write(&genres, common::GENRES_JSON).unwrap();

    let output = castsearch(home.path())
        .arg("--fixture")
        .arg(home.path().join("demo.db"))
        .arg("--genres")
        .arg(&genres)
        .args(["--json", "search", "--genre", "CM"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // Codes 01 and 03 are both "CM"
    assert_eq!(value["total"], 2);
    assert_eq!(value["criteria"]["genre"], "CM");
    assert_eq!(value["projects"][0]["id"], "103");
    assert_eq!(value["projects"][1]["id"], "101");
    assert_eq!(value["projects"][1]["genre_name"], "CM");
}

#[test]
fn test_cli_search_csv_export() {
    let home = demo_home();
    let out = home.path().join("projects.csv");
    castsearch(home.path())
        .arg("--fixture")
        .arg(home.path().join("demo.db"))
        .arg("search")
        .arg("--csv")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Exported 3 rows"));

    let csv = std::fs::read_to_string(&out).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Project ID,Project,Product,Genre,Contact,Budget,Created,Modified")
    );
    assert_eq!(lines.count(), 3);
}

#[test]
fn test_cli_search_csv_default_name() {
    let home = demo_home();
    castsearch(home.path())
        .current_dir(home.path())
        .arg("--fixture")
        .arg(home.path().join("demo.db"))
        .args(["search", "--csv"])
        .assert()
        .success();
    assert!(home.path().join("project_search_results.csv").is_file());
}

#[test]
fn test_cli_lists_and_talents() {
    let home = demo_home();
    let db = home.path().join("demo.db");

    castsearch(home.path())
        .arg("--fixture")
        .arg(&db)
        .args(["lists", "101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("最終候補 (ID: 202)"))
        .stdout(predicate::str::contains("一次候補 (ID: 201)"));

    castsearch(home.path())
        .arg("--fixture")
        .arg(&db)
        .args(["talents", "101", "--list", "201"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 talents"))
        .stdout(predicate::str::contains("[(ungrouped)]"))
        .stdout(predicate::str::contains("1000～2000"));
}

#[test]
fn test_cli_talents_from_another_project_are_empty() {
    let home = demo_home();
    castsearch(home.path())
        .arg("--fixture")
        .arg(home.path().join("demo.db"))
        .args(["talents", "102", "--list", "201"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No talents found."));
}

#[test]
fn test_cli_browse_session() {
    let home = demo_home();
    castsearch(home.path())
        .current_dir(home.path())
        .arg("--fixture")
        .arg(home.path().join("demo.db"))
        .arg("browse")
        .write_stdin("set product Cola\nshow\nsearch\nproject 1\nlist 2\nexport\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 project:"))
        .stdout(predicate::str::contains("Selected 春の新商品キャンペーン（Sparkling Cola）- 2024-03-01"))
        .stdout(predicate::str::contains("ID:       101"))
        .stdout(predicate::str::contains("Contact:  佐藤"))
        .stdout(predicate::str::contains("Budget:   5000000"))
        .stdout(predicate::str::contains("Modified: 2024-03-05"))
        .stdout(predicate::str::contains("3 talents"))
        .stdout(predicate::str::contains("Exported 3 rows"));

    assert!(home
        .path()
        .join("春の新商品キャンペーン（Sparkling Cola）- 2024-03-01_201_talents.csv")
        .is_file());
}

#[test]
fn test_cli_genres() {
    let home = TempDir::new().unwrap();
    let genres = home.path().join("genres.json");
    std::fs::write(&genres, common::GENRES_JSON).unwrap();

    castsearch(home.path())
        .env("CASTSEARCH_GENRES", &genres)
        .arg("genres")
        .assert()
        .success()
        .stdout(predicate::str::contains("01, 03"))
        .stdout(predicate::str::contains("Print"));
}

#[test]
fn test_cli_default_genre_file_in_home() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".castsearch");
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(dir.join("product_genre_mapping.json"), r#"{"07": "Radio"}"#).unwrap();

    castsearch(home.path())
        .args(["--json", "genres"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Radio\""));
}

#[test]
fn test_cli_missing_explicit_genre_file_fails() {
    let home = TempDir::new().unwrap();
    castsearch(home.path())
        .arg("--genres")
        .arg(home.path().join("nope.json"))
        .arg("genres")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read genre mapping"));
}

#[test]
fn test_cli_missing_connection_settings_are_listed() {
    let home = TempDir::new().unwrap();
    castsearch(home.path())
        .env("MYSQL_HOST", "db.internal")
        .arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("MYSQL_USER"))
        .stderr(predicate::str::contains("EC2_HOSTNAME"))
        .stderr(predicate::str::contains("EC2_PRIVATE_KEY"))
        .stderr(predicate::str::contains("MYSQL_HOST,").not());
}

#[test]
fn test_cli_missing_fixture_fails() {
    let home = TempDir::new().unwrap();
    castsearch(home.path())
        .arg("--fixture")
        .arg(home.path().join("absent.db"))
        .arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("fixture database not found"));
}

#[test]
fn test_cli_config_init_and_show() {
    let home = TempDir::new().unwrap();
    castsearch(home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    assert!(home.path().join(".castsearch/config.toml").is_file());

    castsearch(home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    std::fs::write(
        home.path().join(".castsearch/config.toml"),
        "[mysql]\nuser = \"reader\"\npassword = \"correct-horse-battery\"\n",
    )
    .unwrap();
    castsearch(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user = \"reader\""))
        .stdout(predicate::str::contains("horse").not());
}
