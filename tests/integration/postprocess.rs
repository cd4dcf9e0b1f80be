#![cfg(unix)]

use crate::common::{FAKE_PDF, TestProject};
use rapuma_cli::config::project::BACKGROUNDS;
use rapuma_cli::project::ProjectPaths;
use rapuma_cli::render::{RenderOptions, render_group};
use std::fs;

fn enable_backgrounds(project: &TestProject, center: bool) {
    project
        .fixture
        .edit_store(&project.fixture.paths().project_conf(), |s| {
            s.set_list(&[BACKGROUNDS], "layers", &["cropmarks", "lines"])?;
            s.set(&[BACKGROUNDS], "centerOnSheet", center)?;
            s.set(&[BACKGROUNDS], "sheetSize", "A4")?;
            s.set(&[BACKGROUNDS], "useWatermark", true)
        })
        .unwrap();
}

#[test]
fn test_render_applies_every_enabled_step() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();
    enable_backgrounds(&project, true);

    let ctx = project.context().unwrap();
    let report = render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    let post = &report.postprocess;
    assert!(post.background_rebuilt);
    assert!(post.centered);
    assert!(post.background_merged);

    let pdf = ctx.paths.group_pdf("g1");
    let view = ProjectPaths::view_pdf(&pdf);
    assert_eq!(post.view.as_deref(), Some(view.as_path()));
    assert_eq!(fs::read_to_string(&view).unwrap(), FAKE_PDF);
    assert!(ctx.paths.background_pdf().is_file());

    // background and watermark conversions, one centering, background and
    // watermark merges
    assert_eq!(project.tools.calls_to("rsvg-convert").len(), 2);
    assert_eq!(project.tools.calls_to("gs").len(), 1);
    let merges = project.tools.calls_to("pdftk");
    assert_eq!(merges.len(), 2);
    assert!(merges[0].contains(&format!("{} background", pdf.display())));

    // Nothing changed: no tool runs again
    project.tools.clear_log();
    let again = render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    assert!(!again.rendered());
    assert!(!again.postprocess.background_rebuilt);
    assert!(!again.postprocess.background_merged);
    assert_eq!(again.postprocess.view.as_deref(), Some(view.as_path()));
    assert!(project.tools.calls().is_empty());
}

#[test]
fn test_forced_background_is_rebuilt_without_rerendering() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();
    enable_backgrounds(&project, false);
    let ctx = project.context().unwrap();
    render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    project.tools.clear_log();

    let options = RenderOptions {
        force_background: true,
        ..RenderOptions::default()
    };
    let report = render_group(&ctx, "g1", &options).unwrap();
    assert!(!report.rendered());
    assert!(report.postprocess.background_rebuilt);
    assert!(!report.postprocess.background_merged);
    assert!(!report.postprocess.centered);
    assert!(project.tools.calls_to("xetex").is_empty());
}

#[test]
fn test_failed_background_conversion_is_skipped() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();
    enable_backgrounds(&project, false);
    project
        .fixture
        .edit_store(&project.fixture.paths().project_conf(), |s| s.set(&[BACKGROUNDS], "useWatermark", false))
        .unwrap();
    project.tools.write_tool("rsvg-convert", 1, false).unwrap();

    let ctx = project.context().unwrap();
    let report = render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    assert!(report.rendered());
    assert!(report.postprocess.background.is_none());
    assert!(!report.postprocess.background_merged);
    assert!(!ctx.paths.background_pdf().exists());
    assert!(project.tools.calls_to("pdftk").is_empty());
}

#[test]
fn test_failed_centering_forces_the_next_render() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();
    enable_backgrounds(&project, true);
    project.tools.write_tool("gs", 1, false).unwrap();

    let ctx = project.context().unwrap();
    assert!(render_group(&ctx, "g1", &RenderOptions::default()).is_err());
    assert!(!ctx.paths.group_pdf("g1").exists());

    project.tools.write_tool("gs", 0, true).unwrap();
    project.tools.clear_log();
    let report = render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    assert!(report.rendered());
    assert!(report.postprocess.centered);
    assert!(report.postprocess.background_merged);
    assert_eq!(project.tools.calls_to("gs").len(), 1);
}
