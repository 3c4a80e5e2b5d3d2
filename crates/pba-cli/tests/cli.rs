//! CLI command integration tests.
//! Each test uses a temp directory via PBA_DATA_DIR for full isolation, zero
//! delays, and an unreachable model endpoint so every model call falls back.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "auth_delay_ms = 0\ncinematic_step_ms = 0\ncinematic_final_ms = 0\n",
    )
    .unwrap();
    dir
}

fn pba_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pba").unwrap();
    cmd.env("PBA_DATA_DIR", data_dir.path())
        .env("PBA_API_BASE", "http://127.0.0.1:9")
        .env("GEMINI_API_KEY", "test-key")
        .env_remove("API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// Walk LANDING -> AUTH -> INTAKE -> CINEMATIC -> DASHBOARD.
fn register(dir: &TempDir) {
    pba_cmd(dir).arg("uplink").assert().success();
    pba_cmd(dir)
        .args(["auth", "--email", "asset@archive.test", "--code", "0451"])
        .assert()
        .success();
    pba_cmd(dir)
        .args(["intake", "--name", "Ada Lovelace", "--dob", "1815-12-10"])
        .args(["--time", "06:00", "--location", "London, UK"])
        .assert()
        .success();
}

#[test]
fn status_fresh_archive() {
    let dir = data_dir();
    pba_cmd(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("view:      LANDING"))
        .stdout(predicate::str::contains("asset:     none"))
        .stdout(predicate::str::contains("theme:     dark"));
}

#[test]
fn auth_before_uplink_is_rejected() {
    let dir = data_dir();
    pba_cmd(&dir)
        .args(["auth", "--email", "a@b.test", "--code", "1"])
        .assert()
        .failure();
    pba_cmd(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("view:      LANDING"));
}

#[test]
fn auth_requires_credentials() {
    let dir = data_dir();
    pba_cmd(&dir).arg("uplink").assert().success().stdout("AUTH\n");
    pba_cmd(&dir)
        .args(["auth", "--code", "0451"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email and access code are required"));
}

#[test]
fn view_survives_restart() {
    let dir = data_dir();
    pba_cmd(&dir).arg("uplink").assert().success();
    pba_cmd(&dir)
        .args(["auth", "--email", "asset@archive.test", "--code", "0451"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INTAKE"));
    pba_cmd(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("view:      INTAKE"));
}

#[test]
fn intake_keeps_partial_draft() {
    let dir = data_dir();
    pba_cmd(&dir).arg("uplink").assert().success();
    pba_cmd(&dir)
        .args(["auth", "--email", "asset@archive.test", "--code", "0451"])
        .assert()
        .success();

    pba_cmd(&dir)
        .args(["intake", "--name", "Ada Lovelace"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("intake incomplete"));

    pba_cmd(&dir)
        .args(["intake", "--dob", "1815-12-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ASSET REGISTERED: PBA-ASSET-"))
        .stdout(predicate::str::contains("DASHBOARD"));

    pba_cmd(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada Lovelace"))
        .stdout(predicate::str::contains("view:      DASHBOARD"));
}

#[test]
fn dashboard_locked_without_profile() {
    let dir = data_dir();
    pba_cmd(&dir)
        .args(["dossier", "metrics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dashboard is locked"));
}

#[test]
fn metrics_after_registration() {
    let dir = data_dir();
    register(&dir);
    pba_cmd(&dir)
        .args(["dossier", "metrics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("western:    Sagittarius"))
        .stdout(predicate::str::contains("earth:      Pig"));
}

#[test]
fn unreachable_model_falls_back() {
    let dir = data_dir();
    register(&dir);
    pba_cmd(&dir)
        .args(["ops", "terminal", "scan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SYSTEM READY. WELCOME AGENT."))
        .stdout(predicate::str::contains("HANDLER@ARCHIVE:~$ scan"))
        .stdout(predicate::str::contains("SIGNAL INTERFERENCE DETECTED."));

    pba_cmd(&dir)
        .args(["chat", "status", "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TRANSMISSION FAILED."));
    pba_cmd(&dir)
        .arg("chat")
        .assert()
        .success()
        .stdout(predicate::str::contains("[USER] status report"))
        .stdout(predicate::str::contains("[MODEL] TRANSMISSION FAILED."));
}

#[test]
fn empty_explore_query_is_rejected() {
    let dir = data_dir();
    register(&dir);
    pba_cmd(&dir).arg("explore").assert().failure();
}

#[test]
fn theme_toggle_persists() {
    let dir = data_dir();
    pba_cmd(&dir).args(["theme", "toggle"]).assert().success().stdout("light\n");
    pba_cmd(&dir).arg("theme").assert().success().stdout("light\n");
}

#[test]
fn tool_catalog_lists_launcher() {
    let dir = data_dir();
    register(&dir);
    pba_cmd(&dir)
        .arg("tool")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dream Interpreter"))
        .stdout(predicate::str::contains("matrix-num"));
}

#[test]
fn logout_keeps_remembered_email() {
    let dir = data_dir();
    register(&dir);
    pba_cmd(&dir).arg("logout").assert().success().stdout("LANDING\n");
    pba_cmd(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("asset:     none"));

    // A second login reuses the remembered email.
    pba_cmd(&dir).arg("uplink").assert().success();
    pba_cmd(&dir)
        .args(["auth", "--code", "0451"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INTAKE"));
}

#[test]
fn purge_requires_confirmation() {
    let dir = data_dir();
    register(&dir);
    pba_cmd(&dir).arg("purge").assert().failure();
    pba_cmd(&dir)
        .args(["purge", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ARCHIVE PURGED. LANDING"));
    pba_cmd(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("view:      LANDING"));
}
