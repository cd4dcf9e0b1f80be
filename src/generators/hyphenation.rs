//! Hyphenation exceptions and the lccode file.
//!
//! Both exist only for groups with `useHyphenation`. The exceptions file is
//! built from the processed word list in `Hyphenation/`; the lccode file
//! marks the project's non-word-forming characters so the renderer does not
//! break words at them.

use crate::artifact::ArtifactKind;
use crate::config::project::HYPHENATION;
use crate::core::{ProjectContext, RapumaError};
use crate::generators::{ArtifactGenerator, BuildRequest, file_header};
use crate::utils::fs::safe_write;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Non-breaking hyphen; always word forming.
const NB_HYPHEN: &str = "2011";
const HYPHEN_MINUS: &str = "002D";

/// Word-list line to a hyphenation entry. Comments and blank lines yield
/// nothing.
fn exception_word(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.replace("<->", "-"))
}

pub struct HyphenationGenerator;

impl ArtifactGenerator for HyphenationGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::HyphenationExceptions
    }

    fn targets(&self, ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf> {
        if req.group.use_hyphenation {
            vec![ctx.paths.hyphenation_tex(&req.gid)]
        } else {
            Vec::new()
        }
    }

    fn dependencies(&self, ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf> {
        vec![ctx.paths.word_list(req.ctype())]
    }

    fn generate(&self, ctx: &ProjectContext, req: &BuildRequest) -> Result<()> {
        let list = ctx.paths.word_list(req.ctype());
        if !list.is_file() {
            return Err(RapumaError::MissingRequiredSource {
                path: list.display().to_string(),
            }
            .into());
        }
        let words = fs::read_to_string(&list)
            .with_context(|| format!("Failed to read word list: {}", list.display()))?;

        let target = ctx.paths.hyphenation_tex(&req.gid);
        let mut content = file_header(&target, "Hyphenation exceptions", false);
        content.push_str("\\hyphenation{\n");
        let mut count = 0;
        for word in words.lines().filter_map(exception_word) {
            content.push_str(&word);
            content.push('\n');
            count += 1;
        }
        content.push_str("}\n");
        debug!("Wrote {} hyphenation exception(s) for {}", count, req.gid);
        safe_write(&target, &content)
    }
}

/// One configured character as four or more uppercase hex digits.
///
/// Accepts a literal character or its code point written in hex.
fn code_point(spec: &str) -> Option<String> {
    let spec = spec.trim();
    let mut chars = spec.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(format!("{:04X}", u32::from(c)));
    }
    let hex = spec.trim_start_matches("U+").trim_start_matches("u+");
    if (4..=6).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        let value = u32::from_str_radix(hex, 16).ok()?;
        return Some(format!("{value:04X}"));
    }
    None
}

/// Normalised non-word-forming characters, in configured order.
fn non_word_forming(ctx: &ProjectContext) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for spec in ctx.config.project.get_list_or_empty(&[HYPHENATION], "nonWordFormingChars") {
        match code_point(&spec) {
            Some(code) if code == NB_HYPHEN || code == HYPHEN_MINUS => {}
            Some(code) => {
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
            None => warn!("Ignoring non-word-forming character '{}'", spec),
        }
    }
    codes
}

pub struct LccodeGenerator;

impl ArtifactGenerator for LccodeGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Lccode
    }

    fn targets(&self, ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf> {
        if req.group.use_hyphenation {
            vec![ctx.paths.lccode_file(req.ctype())]
        } else {
            Vec::new()
        }
    }

    fn dependencies(&self, ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf> {
        vec![ctx.paths.hyphenation_tex(&req.gid), ctx.paths.project_conf()]
    }

    fn generate(&self, ctx: &ProjectContext, req: &BuildRequest) -> Result<()> {
        let target = ctx.paths.lccode_file(req.ctype());
        let mut content = file_header(&target, "Characters that do not form words", false);
        content.push_str(&format!("\\lccode \"{NB_HYPHEN} = \"{NB_HYPHEN}\n"));
        for code in non_word_forming(ctx) {
            content.push_str(&format!("\\lccode \"{code} = \"{code}\n"));
        }
        content.push_str(&format!("\\catcode \"{NB_HYPHEN} = 11\n"));
        safe_write(&target, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::project::{GROUPS, keys};
    use crate::test_utils::ProjectFixture;

    fn hyphenated_fixture() -> ProjectFixture {
        let fixture = ProjectFixture::new().unwrap();
        fixture.add_group_config("g1", &["gen"]).unwrap();
        fixture
            .edit_store(&fixture.paths().project_conf(), |s| {
                s.set(&[GROUPS, "g1"], keys::USE_HYPHENATION, true)
            })
            .unwrap();
        fixture
    }

    #[test]
    fn test_exceptions_from_word_list() {
        let fixture = hyphenated_fixture();
        fixture.write_word_list("usfm", "# processed list\nbe<->gin\n\nwa-ter\n").unwrap();
        let ctx = fixture.context().unwrap();
        let req = BuildRequest::new(&ctx, "g1", None).unwrap();

        HyphenationGenerator.generate(&ctx, &req).unwrap();
        let content = fs::read_to_string(ctx.paths.hyphenation_tex("g1")).unwrap();
        assert!(content.contains("\\hyphenation{\nbe-gin\nwa-ter\n}\n"));
        assert!(!content.contains("processed list"));
    }

    #[test]
    fn test_missing_word_list() {
        let fixture = hyphenated_fixture();
        let ctx = fixture.context().unwrap();
        let req = BuildRequest::new(&ctx, "g1", None).unwrap();
        let err = HyphenationGenerator.generate(&ctx, &req).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RapumaError>(),
            Some(RapumaError::MissingRequiredSource { .. })
        ));
    }

    #[test]
    fn test_disabled_group_has_no_targets() {
        let fixture = ProjectFixture::new().unwrap();
        fixture.add_group_config("g1", &["gen"]).unwrap();
        let ctx = fixture.context().unwrap();
        let req = BuildRequest::new(&ctx, "g1", None).unwrap();
        assert!(HyphenationGenerator.targets(&ctx, &req).is_empty());
        assert!(LccodeGenerator.targets(&ctx, &req).is_empty());
    }

    #[test]
    fn test_lccode_lines() {
        let fixture = hyphenated_fixture();
        fixture
            .edit_store(&fixture.paths().project_conf(), |s| {
                s.set_list(&[HYPHENATION], "nonWordFormingChars", &["'", "2019", "0027", "-", "zz"])
            })
            .unwrap();
        let ctx = fixture.context().unwrap();
        let req = BuildRequest::new(&ctx, "g1", None).unwrap();

        LccodeGenerator.generate(&ctx, &req).unwrap();
        let content = fs::read_to_string(ctx.paths.lccode_file("usfm")).unwrap();
        let body: Vec<&str> = content.lines().filter(|l| l.starts_with('\\')).collect();
        assert_eq!(
            body,
            vec![
                "\\lccode \"2011 = \"2011",
                "\\lccode \"0027 = \"0027",
                "\\lccode \"2019 = \"2019",
                "\\catcode \"2011 = 11",
            ]
        );
    }

    #[test]
    fn test_code_point_forms() {
        assert_eq!(code_point("'").as_deref(), Some("0027"));
        assert_eq!(code_point("\u{2019}").as_deref(), Some("2019"));
        assert_eq!(code_point("a0"), None);
        assert_eq!(code_point("1F600").as_deref(), Some("1F600"));
        assert_eq!(code_point("u+00ad").as_deref(), Some("00AD"));
    }
}
