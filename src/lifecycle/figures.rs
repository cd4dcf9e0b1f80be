//! Figure markers and endnotes in working texts.
//!
//! `\fig DESC|FILE|SIZE|LOC|COPY|CAP|REF\fig*` markers are lifted out of the
//! text. Each becomes a record in `illustration.toml` under
//! `[<gid>.<illustrationID>]` and a line in the component's piclist file,
//! which the macro package reads instead of the inline marker.

use crate::config::ConfigStore;
use crate::generators::file_header;
use crate::utils::fs::{remove_file_forced, safe_write};
use anyhow::Result;
use regex::Regex;
use std::path::Path;
use tracing::{info, warn};

const FIELDS: [&str; 7] = ["description", "fileName", "width", "location", "copyright", "caption", "reference"];

/// One extracted figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    pub description: String,
    pub file_name: String,
    pub width: String,
    pub location: String,
    pub copyright: String,
    pub caption: String,
    pub reference: String,
    pub illustration_id: String,
    pub bid: String,
    pub chapter: String,
    pub verse: String,
    pub scale: String,
    pub position: String,
}

impl Figure {
    fn parse(body: &str, cid: &str, reference_re: &Regex) -> Self {
        let mut parts = body.split('|').map(str::trim);
        let mut next = || parts.next().unwrap_or_default().to_string();
        let (description, file_name, width, location, copyright, caption, reference) =
            (next(), next(), next(), next(), next(), next(), next());

        let (chapter, verse) = reference_re
            .captures(&reference.to_ascii_uppercase())
            .map(|c| (c[1].to_string(), c[2].to_string()))
            .unwrap_or_default();
        let location = if location.is_empty() && !chapter.is_empty() {
            format!("{chapter}:{verse}")
        } else {
            location
        };
        let illustration_id = Path::new(&file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let position = if width == "col" { "tl" } else { "t" }.to_string();

        Self {
            description,
            file_name,
            width,
            location,
            copyright,
            caption,
            reference,
            illustration_id,
            bid: cid.to_ascii_lowercase(),
            chapter,
            verse,
            scale: "1.0".to_string(),
            position,
        }
    }

    /// Line for the piclist file.
    #[must_use]
    pub fn piclist_line(&self) -> String {
        format!(
            "{} {}.{} |{}|{}|{}|{}|{}|{}|{}",
            self.bid,
            self.chapter,
            self.verse,
            self.file_name,
            self.width,
            self.position,
            self.scale,
            self.copyright,
            self.caption,
            self.location
        )
    }

    fn record(&self) -> [(&'static str, &str); 13] {
        [
            (FIELDS[0], self.description.as_str()),
            (FIELDS[1], self.file_name.as_str()),
            (FIELDS[2], self.width.as_str()),
            (FIELDS[3], self.location.as_str()),
            (FIELDS[4], self.copyright.as_str()),
            (FIELDS[5], self.caption.as_str()),
            (FIELDS[6], self.reference.as_str()),
            ("illustrationID", self.illustration_id.as_str()),
            ("bid", self.bid.as_str()),
            ("chapter", self.chapter.as_str()),
            ("verse", self.verse.as_str()),
            ("scale", self.scale.as_str()),
            ("position", self.position.as_str()),
        ]
    }
}

/// Remove every `\fig` marker from `text`, returning the remaining text and
/// the figures in order of appearance.
pub fn extract_figures(text: &str, cid: &str) -> Result<(String, Vec<Figure>)> {
    let fig = Regex::new(r"(?s)\\fig\s(.*?)\\fig\*")?;
    let reference = Regex::new(r"[A-Z0-9]+\s([0-9]+)[.:]([0-9]+)")?;
    let figures = fig.captures_iter(text).map(|c| Figure::parse(&c[1], cid, &reference)).collect();
    Ok((fig.replace_all(text, "").into_owned(), figures))
}

/// Remove `\fe ...\fe*` endnotes. Returns the text and how many were removed.
pub fn strip_endnotes(text: &str) -> Result<(String, usize)> {
    let fe = Regex::new(r"(?s)\\fe\s.*?\\fe\*")?;
    let count = fe.find_iter(text).count();
    Ok((fe.replace_all(text, "").into_owned(), count))
}

/// Replace the figure records of `cid` in group `gid`. Returns whether the
/// store changed.
pub fn store_figures(store: &mut ConfigStore, gid: &str, cid: &str, figures: &[Figure]) -> Result<bool> {
    let stale: Vec<String> = store
        .keys(&[gid])
        .into_iter()
        .filter(|id| store.get_str(&[gid, id.as_str()], "bid").is_some_and(|b| b.eq_ignore_ascii_case(cid)))
        .collect();
    let mut changed = false;
    for id in &stale {
        changed |= store.remove_section(&[gid, id.as_str()]);
    }
    for figure in figures.iter().filter(|f| !f.illustration_id.is_empty()) {
        let section = [gid, figure.illustration_id.as_str()];
        for (key, value) in figure.record() {
            store.set(&section, key, value)?;
        }
        changed = true;
    }
    Ok(changed)
}

/// Write `<cid>.piclist`, or remove it when there are no figures.
pub fn write_piclist(path: &Path, figures: &[Figure]) -> Result<()> {
    if figures.is_empty() {
        return remove_file_forced(path);
    }
    let mut content = file_header(path, "Illustration placement for this component", false);
    for figure in figures {
        content.push_str(&figure.piclist_line());
        content.push('\n');
    }
    safe_write(path, &content)?;
    info!(target: "lifecycle", "Wrote {} illustration(s) to {}", figures.len(), path.display());
    Ok(())
}

/// Log endnotes that were dropped from a working text.
pub fn warn_endnotes(cid: &str, count: usize) {
    if count > 0 {
        warn!(target: "lifecycle", "Removed {} endnote(s) from {}; endnotes are not supported", count, cid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TEXT: &str = "\\id GEN\n\\c 1\n\\p\n\\v 1 Words.\n\
        \\fig The garden|garden.jpg|col||Public domain|Eden|Gen 1.8\\fig*\n\
        \\v 2 More\\fe + \\ft A note.\\fe* words.\n\
        \\fig Map|map.png|span|2:3|(c) Someone|The land|GEN 2:3\\fig*\n";

    #[test]
    fn test_extract_figures() {
        let (text, figures) = extract_figures(TEXT, "GEN").unwrap();
        assert!(!text.contains("\\fig"));
        assert!(text.contains("\\v 2 More"));
        assert_eq!(figures.len(), 2);

        let garden = &figures[0];
        assert_eq!(garden.illustration_id, "garden");
        assert_eq!((garden.chapter.as_str(), garden.verse.as_str()), ("1", "8"));
        assert_eq!(garden.location, "1:8");
        assert_eq!(garden.position, "tl");
        assert_eq!(garden.bid, "gen");
        assert_eq!(garden.piclist_line(), "gen 1.8 |garden.jpg|col|tl|1.0|Public domain|Eden|1:8");

        let map = &figures[1];
        assert_eq!(map.position, "t");
        assert_eq!(map.location, "2:3");
        assert_eq!(map.copyright, "(c) Someone");
    }

    #[test]
    fn test_strip_endnotes() {
        let (text, count) = strip_endnotes(TEXT).unwrap();
        assert_eq!(count, 1);
        assert!(text.contains("\\v 2 More words."));
    }

    #[test]
    fn test_store_figures_replaces_component_records() {
        let mut store = ConfigStore::parse("illustration.toml", "").unwrap();
        let (_, figures) = extract_figures(TEXT, "gen").unwrap();
        assert!(store_figures(&mut store, "g1", "gen", &figures).unwrap());
        store.set(&["g1", "other"], "bid", "exo").unwrap();
        assert_eq!(store.keys(&["g1"]), vec!["garden", "map", "other"]);
        assert_eq!(store.get_str(&["g1", "map"], "fileName").as_deref(), Some("map.png"));

        assert!(store_figures(&mut store, "g1", "gen", &figures[..1]).unwrap());
        assert_eq!(store.keys(&["g1"]), vec!["other", "garden"]);
    }

    #[test]
    fn test_piclist_written_and_removed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gen.piclist");
        let (_, figures) = extract_figures(TEXT, "gen").unwrap();

        write_piclist(&path, &figures).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("% gen.piclist\n"));
        assert!(content.contains("gen 2.3 |map.png|span|t|1.0|(c) Someone|The land|2:3\n"));

        write_piclist(&path, &[]).unwrap();
        assert!(!path.exists());
    }
}
