#![cfg(unix)]

use crate::common::TestProject;
use rapuma_cli::artifact::ArtifactKind;
use rapuma_cli::config::project::{GROUPS, keys};
use rapuma_cli::render::{RenderOptions, render_group};
use rapuma_cli::test_utils::set_mtime;
use std::collections::BTreeSet;
use std::fs;
use std::time::SystemTime;

#[test]
fn test_second_render_is_a_no_op() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen", "exo"]).unwrap();
    let ctx = project.context().unwrap();

    let first = render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    assert!(first.rendered());
    assert!(first.assembly.regenerated.contains(&ArtifactKind::Settings));
    let control = fs::read(ctx.paths.control_file("g1")).unwrap();
    project.tools.clear_log();

    let second = render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    assert!(!second.rendered());
    assert!(second.assembly.regenerated.is_empty());
    assert!(!second.assembly.control_changed);
    assert_eq!(fs::read(ctx.paths.control_file("g1")).unwrap(), control);
    assert!(project.tools.calls().is_empty());
}

#[test]
fn test_touched_word_list_regenerates_only_its_dependents() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();
    project.fixture.write_word_list("usfm", "be<->gin\n").unwrap();
    project
        .fixture
        .edit_store(&project.fixture.paths().project_conf(), |s| {
            s.set(&[GROUPS, "g1"], keys::USE_HYPHENATION, true)
        })
        .unwrap();
    let ctx = project.context().unwrap();
    render_group(&ctx, "g1", &RenderOptions::default()).unwrap();

    project.fixture.backdate(100).unwrap();
    set_mtime(&ctx.paths.word_list("usfm"), SystemTime::now()).unwrap();

    let report = render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    let regenerated: BTreeSet<_> = report.assembly.regenerated.iter().copied().collect();
    assert_eq!(regenerated, BTreeSet::from([ArtifactKind::HyphenationExceptions, ArtifactKind::Lccode]));
    assert!(report.rendered());
}

#[test]
fn test_edited_working_text_rerenders_without_regeneration() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();
    let ctx = project.context().unwrap();
    render_group(&ctx, "g1", &RenderOptions::default()).unwrap();

    project.fixture.backdate(100).unwrap();
    set_mtime(&ctx.paths.working_text("gen", "usfm"), SystemTime::now()).unwrap();

    let report = render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    assert!(report.assembly.regenerated.is_empty());
    assert!(!report.assembly.control_changed);
    assert!(report.rendered());
}

#[test]
fn test_force_rerenders_current_output() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();
    let ctx = project.context().unwrap();
    render_group(&ctx, "g1", &RenderOptions::default()).unwrap();

    let options = RenderOptions {
        force: true,
        ..RenderOptions::default()
    };
    let report = render_group(&ctx, "g1", &options).unwrap();
    assert!(report.rendered());
    assert!(report.assembly.regenerated.is_empty());
    assert_eq!(project.tools.calls_to("xetex").len(), 2);
}
