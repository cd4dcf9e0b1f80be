#![cfg(unix)]

use crate::common::{TestProject, directive_lines};
use rapuma_cli::config::project::{GROUPS, keys};
use rapuma_cli::render::{RenderOptions, render_group};
use std::fs;

fn content_lines(lines: &[String]) -> Vec<&String> {
    lines.iter().filter(|l| l.starts_with("\\ptxfile")).collect()
}

#[test]
fn test_control_file_follows_component_list() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen", "exo"]).unwrap();
    let conf = project.fixture.paths().project_conf();
    project.fixture.write_word_list("usfm", "be<->gin\nen-ding\n").unwrap();
    project.fixture.edit_store(&conf, |s| s.set(&[GROUPS, "g1"], keys::USE_HYPHENATION, true)).unwrap();

    let ctx = project.context().unwrap();
    let report = render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    assert!(report.rendered());
    assert!(ctx.paths.group_pdf("g1").is_file());

    let lines = directive_lines(&fs::read_to_string(ctx.paths.control_file("g1")).unwrap());
    let position = |needle: &str| {
        lines.iter().position(|l| l.contains(needle)).unwrap_or_else(|| panic!("{needle} missing from {lines:?}"))
    };
    let first_style = lines.iter().position(|l| l.starts_with("\\stylesheet")).unwrap();
    assert!(position("usfm_macLink.tex") < position("usfm_set.tex"));
    assert!(position("usfm_set.tex") < position("usfm-ext.tex"));
    assert!(position("usfm-ext.tex") < position("g1_hyphenation.tex"));
    assert!(position("g1_hyphenation.tex") < first_style);
    assert_eq!(lines.iter().filter(|l| l.starts_with("\\stylesheet")).count(), 3);

    let content = content_lines(&lines);
    assert_eq!(content.len(), 2);
    assert!(content[0].contains("gen_base.usfm"));
    assert!(content[1].contains("exo_base.usfm"));
    assert!(first_style < position("gen_base.usfm"));
    assert_eq!(lines.last().map(String::as_str), Some("\\bye"));

    // Drop exo from the group
    project.fixture.backdate(100).unwrap();
    project.fixture.edit_store(&conf, |s| s.set_list(&[GROUPS, "g1"], keys::CID_LIST, &["gen"])).unwrap();

    let ctx = project.context().unwrap();
    let report = render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    assert!(report.assembly.control_changed);
    assert!(report.rendered());

    let lines = directive_lines(&fs::read_to_string(ctx.paths.control_file("g1")).unwrap());
    let content = content_lines(&lines);
    assert_eq!(content.len(), 1);
    assert!(content[0].contains("gen_base.usfm"));
    assert_eq!(project.tools.calls_to("xetex").len(), 2);
}

#[test]
fn test_subset_render_keeps_group_pdf() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen", "exo"]).unwrap();
    let ctx = project.context().unwrap();
    render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    let group_pdf = ctx.paths.group_pdf("g1");
    fs::write(&group_pdf, "full group\n").unwrap();

    let options = RenderOptions {
        cids: vec!["exo".to_string()],
        ..RenderOptions::default()
    };
    let report = render_group(&ctx, "g1", &options).unwrap();
    assert!(report.rendered());
    assert_eq!(report.target, ctx.paths.subset_pdf("g1", &["exo"]));
    assert!(report.target.is_file());
    assert_eq!(fs::read_to_string(&group_pdf).unwrap(), "full group\n");

    let control = fs::read_to_string(ctx.paths.control_file("g1")).unwrap();
    assert!(control.contains("exo_base.usfm"));
    assert!(!control.contains("gen_base.usfm"));
}

#[test]
fn test_missing_renderer_output_fails() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();
    project.tools.write_tool("xetex", 1, false).unwrap();

    let ctx = project.context().unwrap();
    let err = render_group(&ctx, "g1", &RenderOptions::default()).unwrap_err();
    assert!(matches!(
        rapuma_cli::core::find_rapuma_error(&err),
        Some(rapuma_cli::core::RapumaError::RenderOutputMissing { .. })
    ));
}

#[test]
fn test_nonzero_exit_with_output_succeeds() {
    let project = TestProject::new().unwrap();
    project.add_group("g1", &["gen"]).unwrap();
    project.tools.write_tool("xetex", 3, true).unwrap();

    let ctx = project.context().unwrap();
    let report = render_group(&ctx, "g1", &RenderOptions::default()).unwrap();
    let outcome = report.outcome.unwrap();
    assert_eq!(outcome.code, Some(3));
    assert_eq!(outcome.message, "Exit code 3 not understood.");
}
