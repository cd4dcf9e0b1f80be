//! Control file: `Components/<gid>/<gid>.tex`.
//!
//! The control file is rebuilt in full for every render, since a render may
//! cover any subset of the group. Lines appear in a fixed order:
//!
//! 1. macro link, settings, project extension, group TeX extension
//! 2. lccode and hyphenation exceptions
//! 3. stylesheets: default, default extension, group extension
//! 4. `\pageno` for a full-group render starting after page one
//! 5. per component: on-overrides, content, off-overrides
//! 6. `\bye`
//!
//! Required inputs must exist. Optional inputs are written only when they
//! exist and were not omitted by the assembler.

use crate::artifact::ArtifactKind;
use crate::core::{ProjectContext, RapumaError};
use crate::generators::{BuildRequest, file_header, tex_path};
use crate::project::Switch;
use anyhow::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Rendered control file text and every file it refers to.
#[derive(Debug, Clone)]
pub struct ControlPlan {
    pub content: String,
    pub referenced: Vec<PathBuf>,
}

struct PlanBuilder<'a> {
    omitted: &'a BTreeSet<ArtifactKind>,
    content: String,
    referenced: Vec<PathBuf>,
}

impl PlanBuilder<'_> {
    fn line(&mut self, line: &str) {
        self.content.push_str(line);
        self.content.push('\n');
    }

    fn required(&mut self, kind: ArtifactKind, path: PathBuf, directive: impl Fn(&str) -> String) -> Result<()> {
        if !path.is_file() {
            return Err(RapumaError::MissingRequiredArtifact {
                artifact: kind.to_string(),
                path: path.display().to_string(),
            }
            .into());
        }
        self.line(&directive(&tex_path(&path)));
        self.referenced.push(path);
        Ok(())
    }

    fn optional(&mut self, kind: ArtifactKind, path: PathBuf, directive: impl Fn(&str) -> String) {
        if self.omitted.contains(&kind) || !path.is_file() {
            return;
        }
        self.line(&directive(&tex_path(&path)));
        self.referenced.push(path);
    }
}

/// Build the control file for `req`, leaving out `omitted` artifacts.
pub fn control_plan(
    ctx: &ProjectContext,
    req: &BuildRequest,
    omitted: &BTreeSet<ArtifactKind>,
) -> Result<ControlPlan> {
    use ArtifactKind as K;

    let p = &ctx.paths;
    let package = req.package.as_ref();
    let ctype = req.ctype();
    let gid = req.gid.as_str();
    let input = |path: &str| package.input_directive(path);
    let stylesheet = |path: &str| package.stylesheet_directive(path);

    let target = p.control_file(gid);
    let mut plan = PlanBuilder {
        omitted,
        content: file_header(&target, &format!("Control file for group {gid}"), false),
        referenced: Vec::new(),
    };

    plan.required(K::MacroLink, p.maclink_file(ctype), input)?;
    plan.required(K::Settings, p.settings_file(ctype), input)?;
    plan.required(K::Extension, p.extension_file(ctype), input)?;
    if req.group.use_grp_tex_override {
        plan.optional(K::GroupTexExtension, p.group_tex_ext(gid), input);
    }
    if req.group.use_hyphenation {
        plan.optional(K::Lccode, p.lccode_file(ctype), input);
        plan.optional(K::HyphenationExceptions, p.hyphenation_tex(gid), input);
    }

    plan.required(K::DefaultStyle, p.default_style(ctype), stylesheet)?;
    plan.optional(K::DefaultStyleExtension, p.default_style_ext(ctype), stylesheet);
    if req.group.use_grp_sty_override {
        plan.optional(K::GroupStyleExtension, p.group_style_ext(gid), stylesheet);
    }

    if req.full_group && req.group.start_page_number > 1 {
        plan.line(&format!("\\pageno = {}", req.group.start_page_number));
    }

    for cid in &req.cids {
        let tex_override = req.group.comp_tex_override_list.contains(cid);
        let sty_override = req.group.comp_sty_override_list.contains(cid);
        let tex_ext = |s: Switch| p.component_tex_ext(gid, cid, s);
        let sty_ext = |s: Switch| p.component_style_ext(gid, cid, s);

        if tex_override {
            plan.optional(K::ComponentTexExtension, tex_ext(Switch::On), input);
        }
        if sty_override {
            plan.optional(K::ComponentStyleExtension, sty_ext(Switch::On), stylesheet);
        }

        let working = p.working_text(cid, ctype);
        if !working.is_file() {
            return Err(RapumaError::MissingRequiredSource {
                path: working.display().to_string(),
            }
            .into());
        }
        plan.line(&package.content_directive(&tex_path(&working)));
        plan.referenced.push(working);

        if sty_override {
            plan.optional(K::ComponentStyleExtension, sty_ext(Switch::Off), stylesheet);
        }
        if tex_override {
            plan.optional(K::ComponentTexExtension, tex_ext(Switch::Off), input);
        }
    }

    plan.line("\\bye");
    Ok(ControlPlan {
        content: plan.content,
        referenced: plan.referenced,
    })
}

/// Per-component files that feed a render besides the working text.
#[must_use]
pub fn component_inputs(ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf> {
    let mut inputs = Vec::new();
    for cid in &req.cids {
        inputs.push(ctx.paths.working_text(cid, req.ctype()));
        for extra in [ctx.paths.adjustment_file(cid), ctx.paths.piclist_file(cid)] {
            if extra.is_file() {
                inputs.push(extra);
            }
        }
    }
    inputs
}
