use crate::common::TestProject;
use rapuma_cli::core::{RapumaError, find_rapuma_error};
use rapuma_cli::lifecycle::{
    GroupState, UpdateOutcome, list_groups, remove_group, restore_component, uninstall_component,
    unlock_group, update_component,
};
use rapuma_cli::test_utils::usfm_text;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Every file under `root` with its content and modification time.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, (Vec<u8>, SystemTime)> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let path = e.path().to_path_buf();
            let content = fs::read(&path).unwrap();
            let modified = fs::metadata(&path).unwrap().modified().unwrap();
            (path, (content, modified))
        })
        .collect()
}

fn error_of(err: &anyhow::Error) -> &RapumaError {
    find_rapuma_error(err).unwrap_or_else(|| panic!("not a RapumaError: {err:#}"))
}

#[test]
fn test_locked_group_refuses_without_touching_files() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen", "exo"]).unwrap();
    project.fixture.write_source("gen", &format!("{}\\v 3 Changed.\n", usfm_text("gen"))).unwrap();
    let before = snapshot(&project.fixture.home());

    let mut ctx = project.context().unwrap();
    let err = update_component(&mut ctx, "g1", "gen", false).unwrap_err();
    assert!(matches!(error_of(&err), RapumaError::GroupLocked { .. }));
    let err = remove_group(&mut ctx, "g1", false).unwrap_err();
    assert!(matches!(error_of(&err), RapumaError::GroupLocked { .. }));
    let err = uninstall_component(&mut ctx, "g1", "exo", false).unwrap_err();
    assert!(matches!(error_of(&err), RapumaError::GroupLocked { .. }));

    assert_eq!(snapshot(&project.fixture.home()), before);
}

#[test]
fn test_forced_update_relocks_the_group() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();
    let changed = format!("{}\\v 3 Changed.\n", usfm_text("gen"));
    project.fixture.write_source("gen", &changed).unwrap();

    let mut ctx = project.context().unwrap();
    let outcome = update_component(&mut ctx, "g1", "gen", true).unwrap();
    let UpdateOutcome::Updated {
        working,
        backup,
    } = outcome
    else {
        panic!("expected an update");
    };
    assert_eq!(fs::read_to_string(&working).unwrap(), changed);
    assert_eq!(fs::read_to_string(backup.unwrap()).unwrap(), usfm_text("gen"));
    assert_eq!(GroupState::of(&ctx.config, "g1"), GroupState::Locked);

    // The backup brings the previous text back
    let mut reopened = project.context().unwrap();
    assert_eq!(GroupState::of(&reopened.config, "g1"), GroupState::Locked);
    let err = restore_component(&mut reopened, "g1", "gen", false).unwrap_err();
    assert!(matches!(error_of(&err), RapumaError::GroupLocked { .. }));
    restore_component(&mut reopened, "g1", "gen", true).unwrap();
    assert_eq!(fs::read_to_string(&working).unwrap(), usfm_text("gen"));
    assert!(!project.fixture.paths().cv1_file("gen", "usfm").exists());

    unlock_group(&mut reopened, "g1").unwrap();
    let err = restore_component(&mut reopened, "g1", "gen", false).unwrap_err();
    assert!(matches!(error_of(&err), RapumaError::MissingRequiredSource { .. }));
}

#[test]
fn test_uninstall_leaves_only_a_backup() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen", "exo"]).unwrap();
    let paths = project.fixture.paths();
    let working = paths.working_text("exo", "usfm");
    fs::write(&working, "\\id EXO edited by hand\n").unwrap();

    let mut ctx = project.context().unwrap();
    uninstall_component(&mut ctx, "g1", "exo", true).unwrap();

    let remaining: Vec<PathBuf> =
        fs::read_dir(paths.component_dir("exo")).unwrap().map(|e| e.unwrap().path()).collect();
    let cv1 = paths.cv1_file("exo", "usfm");
    assert_eq!(remaining, vec![cv1.clone()]);
    assert_eq!(fs::read_to_string(&cv1).unwrap(), "\\id EXO edited by hand\n");
    assert_eq!(ctx.config.group("g1").unwrap().cid_list, vec!["gen".to_string()]);
    assert_eq!(GroupState::of(&ctx.config, "g1"), GroupState::Locked);
}

#[test]
fn test_shared_component_is_protected() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen", "mat"]).unwrap();
    project.add_group("g2", &["mat"]).unwrap();
    let working = project.fixture.paths().working_text("mat", "usfm");

    for gid in ["g1", "g2"] {
        let mut ctx = project.context().unwrap();
        let err = uninstall_component(&mut ctx, gid, "mat", true).unwrap_err();
        assert!(error_of(&err).is_shared_conflict());
        assert!(working.is_file());
    }

    let ctx = project.context().unwrap();
    assert_eq!(ctx.config.group("g1").unwrap().cid_list, vec!["gen".to_string(), "mat".to_string()]);
    assert_eq!(ctx.config.group("g2").unwrap().cid_list, vec!["mat".to_string()]);

    // Removing g1 keeps the group while it still shares mat
    let mut ctx = project.context().unwrap();
    let outcome = remove_group(&mut ctx, "g1", true).unwrap();
    assert!(!outcome.removed);
    assert_eq!(outcome.kept, vec!["mat".to_string()]);
    assert!(ctx.config.has_group("g1"));
    assert!(working.is_file());
}

#[test]
fn test_remove_group_clears_everything() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();
    project.add_group("g2", &["exo"]).unwrap();

    let mut ctx = project.context().unwrap();
    let outcome = remove_group(&mut ctx, "g1", true).unwrap();
    assert!(outcome.removed);
    assert!(!ctx.paths.group_dir("g1").exists());

    let ctx = project.context().unwrap();
    let groups = list_groups(&ctx).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].gid, "g2");
    assert_eq!(groups[0].state, GroupState::Locked);
}

#[test]
fn test_add_with_missing_source_writes_nothing() {
    let project = TestProject::new().unwrap();
    let conf = project.fixture.paths().project_conf();
    let before = fs::read_to_string(&conf).unwrap();

    let err = project.add_group("g1", &["gen", "rev"]).unwrap_err();
    assert!(matches!(error_of(&err), RapumaError::MissingRequiredSource { .. }));
    assert_eq!(fs::read_to_string(&conf).unwrap(), before);
    assert!(!project.fixture.paths().component_dir("gen").exists());
}

#[test]
fn test_add_rejects_bad_ids_and_duplicates() {
    let project = TestProject::new().unwrap();
    let err = project.add_group("g1", &["gen", "gen"]).unwrap_err();
    assert!(matches!(error_of(&err), RapumaError::DuplicateComponentId { .. }));

    let err = project.add_group("g1", &["ge n"]).unwrap_err();
    assert!(matches!(error_of(&err), RapumaError::InvalidComponentId { .. }));

    project.add_group("g1", &["gen"]).unwrap();
    let err = project.add_group("g1", &["exo"]).unwrap_err();
    assert!(matches!(error_of(&err), RapumaError::GroupExists { .. }));
}
