use crate::common::TestProject;
use predicates::prelude::*;
use rapuma_cli::lifecycle::GroupState;
use std::fs;

#[test]
fn test_project_init_creates_skeleton() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("MYBK");

    let mut cmd = assert_cmd::Command::cargo_bin("rapuma").unwrap();
    cmd.env_remove("RAPUMA_PROJECT")
        .arg("-p")
        .arg(&home)
        .args(["project", "init", "--id", "MYBK"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialised project"));
    assert!(home.join("Config").join("project.toml").is_file());

    // A second init without --force is refused
    let mut cmd = assert_cmd::Command::cargo_bin("rapuma").unwrap();
    cmd.env_remove("RAPUMA_PROJECT").arg("-p").arg(&home).args(["project", "init"]).assert().failure();
}

#[test]
fn test_commands_outside_a_project_fail() {
    let temp = tempfile::tempdir().unwrap();
    let mut cmd = assert_cmd::Command::cargo_bin("rapuma").unwrap();
    cmd.env_remove("RAPUMA_PROJECT")
        .arg("-p")
        .arg(temp.path())
        .args(["group", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("project"));
}

#[test]
fn test_group_add_list_and_lock() {
    let project = TestProject::new().unwrap();
    let source = project.fixture.source_dir();

    project
        .command()
        .unwrap()
        .args(["group", "add", "GOSP", "--source"])
        .arg(&source)
        .args(["--cids", "mat,gen"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added group"));

    let output = project.command().unwrap().args(["group", "list", "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let groups: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(groups[0]["gid"], "GOSP");
    assert_eq!(groups[0]["cType"], "usfm");
    assert_eq!(groups[0]["state"], "locked");
    assert_eq!(groups[0]["cids"], serde_json::json!(["mat", "gen"]));

    project.command().unwrap().args(["group", "unlock", "GOSP"]).assert().success();
    let ctx = project.context().unwrap();
    assert_eq!(GroupState::of(&ctx.config, "GOSP"), GroupState::Unlocked);

    project
        .command()
        .unwrap()
        .args(["group", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GOSP").and(predicate::str::contains("unlocked")));
}

#[test]
fn test_locked_update_reports_suggestion() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();

    project
        .command()
        .unwrap()
        .args(["group", "update", "g1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked"));

    project.command().unwrap().args(["group", "update", "g1", "--force"]).assert().success();
}

#[test]
fn test_uninstall_shared_component_only_warns() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen", "mat"]).unwrap();
    project.add_group("g2", &["mat"]).unwrap();

    project
        .command()
        .unwrap()
        .args(["group", "uninstall", "g1", "mat", "--force"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning"));
    assert!(project.fixture.paths().working_text("mat", "usfm").is_file());
}

#[cfg(unix)]
#[test]
fn test_render_and_bind_through_the_binary() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();
    project
        .fixture
        .edit_store(&project.fixture.paths().project_conf(), |s| {
            s.set(&["Groups", "g1"], "bindingOrder", 1_i64)
        })
        .unwrap();

    project.command().unwrap().args(["render", "g1"]).assert().success();
    assert!(project.fixture.paths().group_pdf("g1").is_file());

    project
        .command()
        .unwrap()
        .args(["render", "g1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));

    project.command().unwrap().args(["bind", "--save"]).assert().success();
    let deliverable = project.fixture.paths().deliverable_dir();
    assert!(deliverable.join("TEST_contents.pdf").is_file());
    let saved = fs::read_dir(&deliverable)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("TEST_contents_"))
        .count();
    assert_eq!(saved, 1);
}

#[test]
fn test_verbose_and_quiet_conflict() {
    let mut cmd = assert_cmd::Command::cargo_bin("rapuma").unwrap();
    cmd.args(["-v", "-q", "bind"]).assert().failure();
}
