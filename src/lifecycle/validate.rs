//! Built-in structural check of USFM working texts.
//!
//! This is not a full USFM parser. It catches the problems that make the
//! renderer fail outright:
//!
//! - the text must open with `\id` naming the component
//! - every backslash must start a marker
//! - `\c` and `\v` must carry a number
//! - a closing marker `\x*` needs an open `\x` before it

use crate::core::RapumaError;
use crate::lifecycle::sources::declared_id;
use anyhow::Result;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Check `text` as the working text of `cid`.
pub fn validate_markup(text: &str, cid: &str, file: &Path) -> Result<()> {
    let fail = |reason: String| -> anyhow::Error {
        RapumaError::ValidationFailed {
            file: file.display().to_string(),
            reason,
        }
        .into()
    };

    let first = text.trim_start_matches('\u{feff}').trim_start();
    if !first.starts_with("\\id") {
        return Err(fail("text does not start with an \\id marker".to_string()));
    }
    match declared_id(first) {
        Some(id) if id.eq_ignore_ascii_case(cid) => {}
        Some(id) => return Err(fail(format!("\\id declares '{id}', expected '{cid}'"))),
        None => return Err(fail("\\id marker has no book code".to_string())),
    }

    let marker = Regex::new(r"^\\(\+?[A-Za-z][A-Za-z0-9]*)(\*?)")?;
    let number = Regex::new(r"^\s+[0-9]+")?;
    let mut open: HashMap<String, usize> = HashMap::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        for (pos, _) in line.match_indices('\\') {
            let rest = &line[pos..];
            let Some(caps) = marker.captures(rest) else {
                return Err(fail(format!("line {line_no}: stray backslash")));
            };
            let name = caps[1].trim_start_matches('+').to_string();
            let closing = !caps[2].is_empty();
            let after = &rest[caps[0].len()..];

            if closing {
                match open.get_mut(&name) {
                    Some(count) if *count > 0 => *count -= 1,
                    _ => {
                        return Err(fail(format!("line {line_no}: \\{name}* closes a marker that is not open")));
                    }
                }
            } else {
                if matches!(name.as_str(), "c" | "v") && !number.is_match(after) {
                    return Err(fail(format!("line {line_no}: \\{name} without a number")));
                }
                *open.entry(name).or_default() += 1;
            }
        }
    }
    Ok(())
}
