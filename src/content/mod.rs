//! Declarative content: named sections with typed fields and a parent link.
//!
//! Content is authored as JSON objects keyed by section name:
//!
//! ```json
//! {
//!   "GreenTiles": { "Texture": "green.png", "TextureSize": [64, 64] },
//!   "Grass":      { "Parent": "GreenTiles", "TextureOrigin": [128, 64] },
//!   "CliffMap":   { "Size": [2, 1], "Row1": ["Grass", "Grass"] }
//! }
//! ```
//!
//! Parsing builds the ownership tree once, so a tile set finds its tiles via
//! [`Content::children`] without scanning every section.

pub mod storage;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::Deserialize;

use crate::error::{Result, TilemapError};

pub use storage::ResourceStorage;

/// Reserved field naming a section's parent.
pub const PARENT_KEY: &str = "Parent";

// ── FieldValue ────────────────────────────────────────────────────────────────

/// A single typed field value.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f32),
    Text(String),
    Vector(Vec<f32>),
    List(Vec<String>),
}

impl FieldValue {
    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "string",
            FieldValue::Vector(_) => "vector",
            FieldValue::List(_) => "string list",
        }
    }
}

// ── Section ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(rename = "Parent", default)]
    parent: Option<String>,
    #[serde(flatten)]
    fields: HashMap<String, FieldValue>,
}

/// One declared section. Field lookups through [`Content`] also see the
/// fields of the parent chain; `own_field` does not.
#[derive(Clone, Debug)]
pub struct Section {
    name: String,
    parent: Option<String>,
    fields: HashMap<String, FieldValue>,
}

impl Section {
    pub fn name(&self) -> &str { &self.name }
    pub fn parent(&self) -> Option<&str> { self.parent.as_deref() }
    pub fn own_field(&self, key: &str) -> Option<&FieldValue> { self.fields.get(key) }
}

// ── Content ───────────────────────────────────────────────────────────────────

/// Parsed content with its parent/child tree.
#[derive(Clone, Debug, Default)]
pub struct Content {
    sections: Vec<Section>,
    by_name: HashMap<String, usize>,
    /// Direct children of each section, indexed like `sections`.
    children: Vec<Vec<usize>>,
}

impl Content {
    /// Parse a single JSON document. `origin` is only used in error messages.
    pub fn from_json_str(text: &str, origin: &Path) -> Result<Self> {
        let raw = parse_document(text, origin)?;
        Self::build(raw)
    }

    /// Load `path`: a single JSON file, or every `*.json` file below a
    /// directory (sorted by path; a later file's section replaces an earlier
    /// one of the same name).
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() {
            Self::load_dir(path)
        } else {
            let text = read_text(path)?;
            Self::from_json_str(&text, path)
        }
    }

    fn load_dir(dir: &Path) -> Result<Self> {
        let files = json_files(dir)?;
        let mut merged = BTreeMap::new();
        for file in &files {
            let text = read_text(file)?;
            for (name, section) in parse_document(&text, file)? {
                if merged.insert(name.clone(), section).is_some() {
                    log::debug!("content: section '{name}' overridden by {file:?}");
                }
            }
        }
        log::debug!("content: merged {} files from {dir:?}", files.len());
        Self::build(merged)
    }

    fn build(raw: BTreeMap<String, RawSection>) -> Result<Self> {
        let mut sections = Vec::with_capacity(raw.len());
        let mut by_name = HashMap::with_capacity(raw.len());
        for (name, r) in raw {
            by_name.insert(name.clone(), sections.len());
            sections.push(Section { name, parent: r.parent, fields: r.fields });
        }

        let mut children = vec![Vec::new(); sections.len()];
        for (i, section) in sections.iter().enumerate() {
            if let Some(parent) = &section.parent {
                let &p = by_name
                    .get(parent)
                    .ok_or_else(|| TilemapError::MissingSection(parent.clone()))?;
                children[p].push(i);
            }
        }

        let content = Self { sections, by_name, children };
        content.check_cycles()?;
        Ok(content)
    }

    fn check_cycles(&self) -> Result<()> {
        for section in &self.sections {
            let mut cur = section.parent.as_deref();
            let mut steps = 0;
            while let Some(name) = cur {
                steps += 1;
                if name == section.name || steps > self.sections.len() {
                    return Err(TilemapError::ParentCycle(section.name.clone()));
                }
                cur = self.sections[self.by_name[name]].parent.as_deref();
            }
        }
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize { self.sections.len() }
    pub fn is_empty(&self) -> bool { self.sections.is_empty() }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn section(&self, name: &str) -> Result<&Section> {
        self.by_name
            .get(name)
            .map(|&i| &self.sections[i])
            .ok_or_else(|| TilemapError::MissingSection(name.to_string()))
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Sections whose declared parent is exactly `name`. Grandchildren are
    /// not included.
    pub fn children<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Section> + use<'a> {
        self.by_name
            .get(name)
            .map(|&i| self.children[i].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&c| &self.sections[c])
    }

    /// Look `key` up on `section`, falling back through its parents.
    pub fn field(&self, section: &str, key: &str) -> Result<Option<&FieldValue>> {
        let mut cur = Some(self.section(section)?);
        while let Some(s) = cur {
            if let Some(v) = s.fields.get(key) {
                return Ok(Some(v));
            }
            cur = s.parent.as_deref().map(|p| &self.sections[self.by_name[p]]);
        }
        Ok(None)
    }

    fn required(&self, section: &str, key: &str) -> Result<&FieldValue> {
        self.field(section, key)?.ok_or_else(|| TilemapError::MissingField {
            section: section.to_string(),
            field: key.to_string(),
        })
    }

    /// A 2- or 3-component vector; a missing `z` reads as `0.0`.
    pub fn vector(&self, section: &str, key: &str) -> Result<Vec3> {
        match self.required(section, key)? {
            FieldValue::Vector(v) if v.len() == 2 => Ok(Vec3::new(v[0], v[1], 0.0)),
            FieldValue::Vector(v) if v.len() == 3 => Ok(Vec3::new(v[0], v[1], v[2])),
            _ => Err(invalid(section, key, "2- or 3-component vector")),
        }
    }

    pub fn string(&self, section: &str, key: &str) -> Result<&str> {
        match self.required(section, key)? {
            FieldValue::Text(s) => Ok(s),
            _ => Err(invalid(section, key, "string")),
        }
    }

    /// An ordered string list. A bare string reads as a one-element list and
    /// an empty array as an empty list.
    pub fn list(&self, section: &str, key: &str) -> Result<Vec<&str>> {
        match self.required(section, key)? {
            FieldValue::List(items) => Ok(items.iter().map(String::as_str).collect()),
            FieldValue::Text(s) => Ok(vec![s.as_str()]),
            FieldValue::Vector(v) if v.is_empty() => Ok(Vec::new()),
            other => {
                log::debug!("content: {section}.{key} is a {}", other.kind());
                Err(invalid(section, key, "string list"))
            }
        }
    }
}

fn invalid(section: &str, key: &str, expected: &'static str) -> TilemapError {
    TilemapError::InvalidField {
        section: section.to_string(),
        field: key.to_string(),
        expected,
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| TilemapError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Every `*.json` file below `dir`, sorted by path. An entry that cannot be
/// read fails the whole walk.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            let source = err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            TilemapError::Io { path, source }
        })?;
        let is_json = entry.path().extension().and_then(|s| s.to_str()) == Some("json");
        if entry.file_type().is_file() && is_json {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn parse_document(text: &str, origin: &Path) -> Result<BTreeMap<String, RawSection>> {
    serde_json::from_str(text).map_err(|source| TilemapError::ContentParse {
        path: origin.to_path_buf(),
        source,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Content> {
        Content::from_json_str(text, Path::new("<test>"))
    }

    const DOC: &str = r#"{
        "Set":    { "Texture": "set.png", "TextureSize": [16, 16] },
        "Grass":  { "Parent": "Set", "TextureOrigin": [16, 0] },
        "Flower": { "Parent": "Grass", "TextureOrigin": [32, 0] },
        "Map":    { "Size": [2, 1], "Row1": ["Grass", "Flower"], "Scale": 2 }
    }"#;

    #[test]
    fn children_are_direct_only() {
        let c = parse(DOC).unwrap();
        let kids: Vec<_> = c.children("Set").map(Section::name).collect();
        assert_eq!(kids, vec!["Grass"]);
        let grandkids: Vec<_> = c.children("Grass").map(Section::name).collect();
        assert_eq!(grandkids, vec!["Flower"]);
        assert_eq!(c.children("Nope").count(), 0);
    }

    #[test]
    fn fields_are_typed() {
        let c = parse(DOC).unwrap();
        assert_eq!(c.string("Set", "Texture").unwrap(), "set.png");
        assert_eq!(c.vector("Set", "TextureSize").unwrap(), Vec3::new(16.0, 16.0, 0.0));
        assert_eq!(c.list("Map", "Row1").unwrap(), vec!["Grass", "Flower"]);
        assert!(matches!(c.field("Map", "Scale").unwrap(), Some(FieldValue::Number(n)) if *n == 2.0));
    }

    #[test]
    fn lookups_inherit_from_parents() {
        let c = parse(DOC).unwrap();
        assert_eq!(c.string("Flower", "Texture").unwrap(), "set.png");
        // Own field shadows the parent's.
        assert_eq!(c.vector("Flower", "TextureOrigin").unwrap(), Vec3::new(32.0, 0.0, 0.0));
    }

    #[test]
    fn wrong_type_is_reported() {
        let c = parse(DOC).unwrap();
        assert!(matches!(c.vector("Set", "Texture"), Err(TilemapError::InvalidField { .. })));
        assert!(matches!(c.string("Set", "Missing"), Err(TilemapError::MissingField { .. })));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let err = parse(r#"{ "Tile": { "Parent": "Ghost" } }"#).unwrap_err();
        assert!(matches!(err, TilemapError::MissingSection(name) if name == "Ghost"));
    }

    #[test]
    fn parent_cycle_is_rejected() {
        let err = parse(r#"{ "A": { "Parent": "B" }, "B": { "Parent": "A" } }"#).unwrap_err();
        assert!(matches!(err, TilemapError::ParentCycle(_)));
    }

    #[test]
    fn directory_merge_lets_later_files_override() {
        let dir = std::env::temp_dir().join(format!("tilepack_content_{}", std::process::id()));
        std::fs::create_dir_all(dir.join("sub")).unwrap();
        std::fs::write(dir.join("a.json"), r#"{ "Set": { "Texture": "old.png" } }"#).unwrap();
        std::fs::write(dir.join("sub/b.json"), r#"{ "Set": { "Texture": "new.png" } }"#).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let c = Content::load(&dir).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.string("Set", "Texture").unwrap(), "new.png");
    }

    #[test]
    fn unreadable_directory_fails_the_walk() {
        let dir = std::env::temp_dir().join(format!("tilepack_missing_{}", std::process::id()));
        let err = json_files(&dir).unwrap_err();
        match err {
            TilemapError::Io { path, source } => {
                assert_eq!(path, dir);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
