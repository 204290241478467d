use assert_cmd::Command;

#[test]
fn export_writes_csv_header_for_empty_history() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("history.csv");

    Command::cargo_bin("keypace")
        .unwrap()
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .arg("--export")
        .arg(&out)
        .assert()
        .success();

    let csv = std::fs::read_to_string(&out).unwrap();
    assert_eq!(
        csv,
        "date,duration,wpm,accuracy,consistency,characters_typed\n"
    );
    assert!(home
        .path()
        .join(".local/state/keypace/history.db")
        .exists());
}

#[test]
fn rejects_duration_off_the_menu() {
    let home = tempfile::tempdir().unwrap();

    Command::cargo_bin("keypace")
        .unwrap()
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .args(["--secs", "45"])
        .assert()
        .failure();
}
