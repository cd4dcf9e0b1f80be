#![cfg(unix)]

use crate::common::{FAKE_PDF, TestProject};
use rapuma_cli::bind::bind;
use rapuma_cli::config::project::{BACKGROUNDS, GROUPS, keys};
use rapuma_cli::render::{RenderOptions, render_group};
use std::fs;

fn render_in_order(project: &TestProject, groups: &[(&str, &str, i64)]) {
    for &(gid, cid, order) in groups {
        project.add_group(gid, &[cid]).unwrap();
        project
            .fixture
            .edit_store(&project.fixture.paths().project_conf(), |s| {
                s.set(&[GROUPS, gid], keys::BINDING_ORDER, order)
            })
            .unwrap();
        let ctx = project.context().unwrap();
        render_group(&ctx, gid, &RenderOptions::default()).unwrap();
    }
}

#[test]
fn test_bind_concatenates_by_binding_order() {
    let project = TestProject::new().unwrap();
    render_in_order(&project, &[("nt", "mat", 2), ("ot", "gen", 1), ("draft", "exo", 0)]);
    project.tools.clear_log();

    let ctx = project.context().unwrap();
    let report = bind(&ctx, true).unwrap();
    assert_eq!(report.groups, vec!["ot".to_string(), "nt".to_string()]);
    assert_eq!(report.output, ctx.paths.deliverable_dir().join("TEST_contents.pdf"));
    assert_eq!(fs::read_to_string(&report.output).unwrap(), FAKE_PDF);
    assert!(report.view.is_none());

    let calls = project.tools.calls_to("gs");
    assert_eq!(calls.len(), 1);
    let ot = ctx.paths.group_pdf("ot").display().to_string();
    let nt = ctx.paths.group_pdf("nt").display().to_string();
    assert!(calls[0].ends_with(&format!("{ot} {nt}")));
    assert!(!calls[0].contains(&ctx.paths.group_pdf("draft").display().to_string()));

    let saved = report.saved.unwrap();
    let name = saved.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("TEST_contents_") && name.ends_with(".pdf"));
    assert_eq!(name.len(), "TEST_contents_YYYYMMDD.pdf".len());
    assert!(saved.is_file());
}

#[test]
fn test_bind_applies_background_and_view() {
    let project = TestProject::new().unwrap();
    render_in_order(&project, &[("ot", "gen", 1)]);
    project
        .fixture
        .edit_store(&project.fixture.paths().project_conf(), |s| {
            s.set_list(&[BACKGROUNDS], "layers", &["box"])?;
            s.set(&[BACKGROUNDS], "useDocInfo", true)
        })
        .unwrap();

    let ctx = project.context().unwrap();
    let report = bind(&ctx, false).unwrap();
    let view = report.view.unwrap();
    assert_eq!(view, ctx.paths.deliverable_dir().join("TEST_contents-view.pdf"));
    assert!(view.is_file());
    assert!(report.saved.is_none());

    let output = report.output.display().to_string();
    let merges = project.tools.calls_to("pdftk");
    assert!(merges.iter().any(|m| m.starts_with(&format!("pdftk {output} background"))));
}

#[test]
fn test_bind_needs_every_group_rendered() {
    let project = TestProject::new().unwrap();
    render_in_order(&project, &[("ot", "gen", 1)]);
    project.add_group("nt", &["mat"]).unwrap();
    project
        .fixture
        .edit_store(&project.fixture.paths().project_conf(), |s| s.set(&[GROUPS, "nt"], keys::BINDING_ORDER, 2_i64))
        .unwrap();

    let ctx = project.context().unwrap();
    let err = bind(&ctx, false).unwrap_err();
    assert!(err.to_string().contains("nt.pdf"));
    assert!(!ctx.paths.deliverable_dir().join("TEST_contents.pdf").exists());
}
