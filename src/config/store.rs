//! Hierarchical key/value configuration store.
//!
//! A [`ConfigStore`] is one TOML file on disk wrapped in a
//! [`toml_edit::DocumentMut`], so section order, key order and user comments
//! survive a round trip through Rapuma. Sections are addressed by a path of
//! names (`&["Groups", "g1"]`), keys by name within that section.
//!
//! Lookups never fail: every query returns an [`Option`] so callers ask
//! "is there a value?" explicitly instead of probing and swallowing errors.
//! The `*_or` variants layer a default on top.
//!
//! Writes replace the whole file atomically ([`ConfigStore::save`]).
//! [`ConfigStore::merge_defaults`] fills in missing keys from a defaults table
//! without ever overwriting a value that is already present.

use crate::core::RapumaError;
use crate::utils::fs::safe_write;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{Array, DocumentMut, Item, Table, Value};
use tracing::debug;

/// One TOML-backed configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    doc: DocumentMut,
}

impl ConfigStore {
    /// Load a store from disk. A missing file yields an empty store bound to `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            debug!("Config file {} not found, starting empty", path.display());
            return Ok(Self {
                path,
                doc: DocumentMut::new(),
            });
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(path, &content)
    }

    /// Build a store from TOML text.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let doc = content.parse::<DocumentMut>().map_err(|e| RapumaError::ConfigError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            path,
            doc,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists_on_disk(&self) -> bool {
        self.path.is_file()
    }

    #[must_use]
    pub fn root(&self) -> &Table {
        self.doc.as_table()
    }

    /// Write the whole store back to its file.
    pub fn save(&self) -> Result<()> {
        safe_write(&self.path, &self.doc.to_string())
            .with_context(|| format!("Failed to save config file: {}", self.path.display()))
    }

    /// Read a section. Nested sections are addressed by path.
    #[must_use]
    pub fn section(&self, section: &[&str]) -> Option<&Table> {
        let mut table = self.doc.as_table();
        for name in section {
            table = table.get(name)?.as_table()?;
        }
        Some(table)
    }

    #[must_use]
    pub fn has_section(&self, section: &[&str]) -> bool {
        self.section(section).is_some()
    }

    /// Keys of a section in document order. Empty when the section is absent.
    #[must_use]
    pub fn keys(&self, section: &[&str]) -> Vec<String> {
        self.section(section)
            .map(|t| t.iter().map(|(k, _)| k.to_string()).collect())
            .unwrap_or_default()
    }

    fn item(&self, section: &[&str], key: &str) -> Option<&Item> {
        self.section(section)?.get(key).filter(|item| !item.is_none())
    }

    /// Whether the section holds a non-empty value for `key`.
    #[must_use]
    pub fn has_value(&self, section: &[&str], key: &str) -> bool {
        match self.item(section, key) {
            Some(item) => item.as_str().is_none_or(|s| !s.is_empty()),
            None => false,
        }
    }

    /// A string value. Scalars of other types are rendered in their TOML
    /// display form (`12`, `1.5`, `true`).
    #[must_use]
    pub fn get_str(&self, section: &[&str], key: &str) -> Option<String> {
        self.item(section, key).and_then(item_to_string)
    }

    #[must_use]
    pub fn get_str_or(&self, section: &[&str], key: &str, default: &str) -> String {
        self.get_str(section, key).unwrap_or_else(|| default.to_string())
    }

    /// A boolean. Accepts TOML booleans and the strings `true`/`false` in any case.
    #[must_use]
    pub fn get_bool(&self, section: &[&str], key: &str) -> Option<bool> {
        let item = self.item(section, key)?;
        if let Some(b) = item.as_bool() {
            return Some(b);
        }
        item.as_str().and_then(parse_flag)
    }

    #[must_use]
    pub fn get_bool_or(&self, section: &[&str], key: &str, default: bool) -> bool {
        self.get_bool(section, key).unwrap_or(default)
    }

    #[must_use]
    pub fn get_int(&self, section: &[&str], key: &str) -> Option<i64> {
        let item = self.item(section, key)?;
        if let Some(i) = item.as_integer() {
            return Some(i);
        }
        item.as_str().and_then(|s| s.trim().parse().ok())
    }

    #[must_use]
    pub fn get_int_or(&self, section: &[&str], key: &str, default: i64) -> i64 {
        self.get_int(section, key).unwrap_or(default)
    }

    #[must_use]
    pub fn get_float(&self, section: &[&str], key: &str) -> Option<f64> {
        let item = self.item(section, key)?;
        if let Some(f) = item.as_float() {
            return Some(f);
        }
        if let Some(i) = item.as_integer() {
            return Some(i as f64);
        }
        item.as_str().and_then(|s| s.trim().trim_end_matches("pt").parse().ok())
    }

    /// A list of strings. A plain string is split on commas and whitespace.
    #[must_use]
    pub fn get_list(&self, section: &[&str], key: &str) -> Option<Vec<String>> {
        let item = self.item(section, key)?;
        if let Some(array) = item.as_array() {
            return Some(array.iter().filter_map(value_to_string).collect());
        }
        item.as_str().map(split_list)
    }

    #[must_use]
    pub fn get_list_or_empty(&self, section: &[&str], key: &str) -> Vec<String> {
        self.get_list(section, key).unwrap_or_default()
    }

    /// Get a section for writing, creating it and its parents when missing.
    pub fn section_mut(&mut self, section: &[&str]) -> Result<&mut Table> {
        let file = self.path.display().to_string();
        let mut table = self.doc.as_table_mut();
        for name in section {
            let item = table.entry(name).or_insert_with(|| {
                let mut t = Table::new();
                t.set_implicit(true);
                Item::Table(t)
            });
            if let Some(inline) = item.as_inline_table().cloned() {
                *item = Item::Table(inline.into_table());
            }
            table = item.as_table_mut().ok_or_else(|| RapumaError::ConfigError {
                file: file.clone(),
                reason: format!("'{name}' is a value, not a section"),
            })?;
        }
        Ok(table)
    }

    /// Set a scalar value.
    pub fn set(&mut self, section: &[&str], key: &str, value: impl Into<Value>) -> Result<()> {
        let table = self.section_mut(section)?;
        table.insert(key, Item::Value(value.into()));
        Ok(())
    }

    /// Set a list of strings.
    pub fn set_list<S: AsRef<str>>(&mut self, section: &[&str], key: &str, values: &[S]) -> Result<()> {
        let mut array = Array::new();
        for v in values {
            array.push(v.as_ref());
        }
        self.set(section, key, array)
    }

    /// Remove a key. Returns whether it was present.
    pub fn remove_key(&mut self, section: &[&str], key: &str) -> bool {
        let mut table = self.doc.as_table_mut();
        for name in section {
            match table.get_mut(name).and_then(Item::as_table_mut) {
                Some(t) => table = t,
                None => return false,
            }
        }
        table.remove(key).is_some()
    }

    /// Remove a whole section. Returns whether it was present.
    pub fn remove_section(&mut self, section: &[&str]) -> bool {
        match section.split_last() {
            Some((last, parents)) => self.remove_key(parents, last),
            None => false,
        }
    }

    /// Merge `defaults` into the section at `section`, never overwriting a
    /// present value. Nested tables are merged recursively. Returns whether
    /// anything was added.
    pub fn merge_defaults(&mut self, section: &[&str], defaults: &Table) -> Result<bool> {
        let target = self.section_mut(section)?;
        Ok(merge_tables(target, defaults))
    }
}

fn merge_tables(target: &mut Table, defaults: &Table) -> bool {
    let mut changed = false;
    for (key, default_item) in defaults.iter() {
        match target.get_mut(key) {
            None => {
                target.insert(key, default_item.clone());
                changed = true;
            }
            Some(existing) => {
                if let (Some(existing), Some(default_table)) =
                    (existing.as_table_mut(), default_item.as_table())
                {
                    changed |= merge_tables(existing, default_table);
                }
            }
        }
    }
    changed
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.value().clone()),
        Value::Integer(i) => Some(i.value().to_string()),
        Value::Float(f) => Some(f.value().to_string()),
        Value::Boolean(b) => Some(b.value().to_string()),
        _ => None,
    }
}

fn item_to_string(item: &Item) -> Option<String> {
    item.as_value().and_then(value_to_string)
}

/// Interpret a textual flag. Unknown text is not a flag.
#[must_use]
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn split_list(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
