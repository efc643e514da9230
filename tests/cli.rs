use assert_cmd::Command;
use predicates::prelude::*;

use typeboard::store::{ContentSource, NewEntry, ResultSink, Store};

fn typeboard(db: &std::path::Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("typeboard").unwrap();
    cmd.arg("--db").arg(db).env("RUST_LOG", "off");
    cmd
}

#[test]
fn add_text_then_list_content() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("typeboard.db");

    let out = typeboard(&db)
        .args(["add", "--text", "pack my box\nwith five dozen", "--title", "Pangram"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let id = String::from_utf8(out).unwrap().trim().to_string();
    assert!(!id.is_empty());

    typeboard(&db)
        .args(["content", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Pangram\""))
        .stdout(predicate::str::contains("pack my box with five dozen"))
        .stdout(predicate::str::contains(id));
}

#[test]
fn add_file_uses_file_stem_as_title() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("typeboard.db");
    let passage = dir.path().join("harbour.txt");
    std::fs::write(&passage, "boats bob in the harbour").unwrap();

    typeboard(&db).arg("add").arg(&passage).assert().success();

    typeboard(&db)
        .arg("content")
        .assert()
        .success()
        .stdout(predicate::str::contains("harbour"))
        .stdout(predicate::str::contains("file"));
}

#[test]
fn add_rejects_blank_text() {
    let dir = tempfile::tempdir().unwrap();
    typeboard(&dir.path().join("typeboard.db"))
        .args(["add", "--text", "   \n  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no content provided"));
}

#[test]
fn leaderboard_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("typeboard.db");
    {
        let store = Store::open(&db).unwrap();
        let content = store.random_content().unwrap();
        for (name, wpm, accuracy) in [("ada", 90.0, 91.0), ("bob", 60.0, 100.0)] {
            store
                .submit(&NewEntry {
                    username: name.into(),
                    content_id: content.id.clone(),
                    wpm,
                    accuracy,
                    duration_seconds: 20,
                    error_count: 0,
                    correct_chars: 100,
                    total_chars: 100,
                })
                .unwrap();
        }
    }

    typeboard(&db)
        .arg("leaderboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("ada"))
        .stdout(predicate::str::contains("0:20"));

    let out = typeboard(&db)
        .args(["leaderboard", "--sort-by", "accuracy", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed[0]["username"], "bob");
    assert_eq!(parsed.as_array().unwrap().len(), 2);

    typeboard(&db)
        .args(["leaderboard", "--limit", "1", "--csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,username,contentId"))
        .stdout(predicate::str::contains("ada"))
        .stdout(predicate::str::contains("bob").not());
}

#[test]
fn leaderboard_unknown_content_fails() {
    let dir = tempfile::tempdir().unwrap();
    typeboard(&dir.path().join("typeboard.db"))
        .args(["leaderboard", "--content", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn empty_leaderboard_message() {
    let dir = tempfile::tempdir().unwrap();
    typeboard(&dir.path().join("typeboard.db"))
        .arg("leaderboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("no scores yet"));
}
