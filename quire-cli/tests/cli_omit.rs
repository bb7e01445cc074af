use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn omit_then_build_skips_note() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let data = dir.path().join("data");
    fs::create_dir_all(&data)?;
    fs::write(data.join("keep.md"), "---\nid: 1\ntitle: Keep\n---\nStays.\n")?;
    fs::write(data.join("hide.md"), "---\nid: 2\ntitle: Hide\n---\nGoes.\n")?;

    #[allow(deprecated)]
    Command::cargo_bin("quire")?
        .current_dir(dir.path())
        .args(["omit", "data/hide.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Specified files will now be ignored during build.",
        ));

    let content = fs::read_to_string(data.join("hide.md"))?;
    assert!(content.contains("omit: true"));
    assert!(content.contains("title: Hide"));

    #[allow(deprecated)]
    Command::cargo_bin("quire")?
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .success();

    let titles = fs::read_to_string(dir.path().join("_site/titles.json"))?;
    assert!(titles.contains("Keep"));
    assert!(!titles.contains("Hide"));
    assert!(!dir.path().join("_site/dataobj/2").exists());

    #[allow(deprecated)]
    Command::cargo_bin("quire")?
        .current_dir(dir.path())
        .args(["omit", "--reverse", "data/hide.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Specified files will no longer be ignored.",
        ));

    assert!(fs::read_to_string(data.join("hide.md"))?.contains("omit: false"));

    Ok(())
}

#[test]
fn omit_reports_each_failure() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("data"))?;
    fs::write(dir.path().join("data/ok.md"), "Body only\n")?;
    fs::write(dir.path().join("outside.md"), "---\nid: 9\n---\n")?;

    #[allow(deprecated)]
    Command::cargo_bin("quire")?
        .current_dir(dir.path())
        .args(["omit", "outside.md", "data/missing.md", "data/ok.md"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Preferences for outside.md could not be saved",
        ))
        .stderr(predicate::str::contains(
            "Preferences for data/missing.md could not be saved",
        ));

    assert_eq!(
        fs::read_to_string(dir.path().join("outside.md"))?,
        "---\nid: 9\n---\n"
    );
    assert!(fs::read_to_string(dir.path().join("data/ok.md"))?.contains("omit: true"));

    Ok(())
}

#[test]
fn omit_requires_files() -> Result<(), Box<dyn std::error::Error>> {
    #[allow(deprecated)]
    Command::cargo_bin("quire")?.arg("omit").assert().failure();
    Ok(())
}
