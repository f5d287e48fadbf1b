use std::path::PathBuf;

use assert_cmd::Command;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bookshelf-cli-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn bookshelf(config_dir: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-cli").unwrap();
    cmd.arg("--config-dir")
        .arg(config_dir)
        .env_remove("BOOKSHELF_ENV")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn openapi_prints_the_books_routes() {
    let dir = scratch_dir("openapi");

    let output = bookshelf(&dir).arg("openapi").output().unwrap();

    assert!(output.status.success());
    let spec: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(spec["paths"]["/api/books"]["get"].is_object());
    assert!(spec["paths"]["/api/books/{id}"]["delete"].is_object());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn migrate_is_idempotent_against_a_sqlite_file() {
    let dir = scratch_dir("migrate");
    let db_path = dir.join("books.db");
    std::fs::write(
        dir.join("base.toml"),
        format!(
            "[database]\nbackend = \"sqlite\"\npath = {:?}\n",
            db_path.to_string_lossy()
        ),
    )
    .unwrap();

    let first = bookshelf(&dir).arg("migrate").output().unwrap();
    assert!(first.status.success());
    assert_eq!(String::from_utf8_lossy(&first.stdout).trim(), "applied 1 migration(s)");

    let second = bookshelf(&dir).arg("migrate").output().unwrap();
    assert!(second.status.success());
    assert_eq!(String::from_utf8_lossy(&second.stdout).trim(), "applied 0 migration(s)");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn unknown_environment_fails() {
    let dir = scratch_dir("bad-env");

    bookshelf(&dir)
        .args(["--env", "qa", "openapi"])
        .assert()
        .failure();

    std::fs::remove_dir_all(dir).ok();
}
