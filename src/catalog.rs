//! Translation catalog.
//!
//! Each locale owns one JSON tree. The tree is assembled from
//! `messages/<lang>/<section>.json`, the section file stem becoming the
//! first segment of every key path (`nav.home`, `carousel.0.title`).
//!
//! Lookups never fail: a path that does not resolve to anything yields an
//! empty string. Completeness across locales is checked once, at startup,
//! through [`Catalog::missing_keys`].

use std::collections::{ BTreeSet, HashMap };
use std::fmt;

use bevy::prelude::*;
use serde_json::Value;

use crate::SiteConfig;

const FALLBACK_LANG: &str = "fr";

/// Errors raised while loading a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// A messages folder or file could not be read.
    Io(std::io::Error),
    /// A translation file is not valid JSON.
    Json(serde_json::Error),
    /// The JSON is valid but not shaped as `{ lang: { section: ... } }`.
    Shape(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read translations: {e}"),
            Self::Json(e) => write!(f, "invalid translation JSON: {e}"),
            Self::Shape(msg) => write!(f, "unexpected catalog layout: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Shape(_) => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// A key path present in some locale but absent from `lang`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MissingKey {
    pub lang: String,
    pub path: String,
}

/// Static mapping from locale code to its translation tree.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    langs: HashMap<String, Value>,
}

impl Catalog {
    /// Catalog generated by `build.rs` from the crate's `messages/` folder.
    pub fn bundled() -> Result<Self, CatalogError> {
        const BUNDLED_TRANSLATIONS: &str = include_str!(
            concat!(env!("OUT_DIR"), "/all_translations.json")
        );

        Self::from_value(serde_json::from_str(BUNDLED_TRANSLATIONS)?)
    }

    /// Builds a catalog from `{ lang: { section: <json>, ... }, ... }`.
    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        let Value::Object(langs_obj) = value else {
            return Err(CatalogError::Shape("top level must be an object of locales".into()));
        };

        let mut langs = HashMap::new();
        for (lang_code, sections) in langs_obj {
            if !sections.is_object() {
                return Err(
                    CatalogError::Shape(format!("locale '{lang_code}' must map section names to values"))
                );
            }
            langs.insert(lang_code, sections);
        }

        Ok(Self { langs })
    }

    /// Reads `<messages_folder>/<lang>/<section>.json` at runtime.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_dir(messages_folder: impl AsRef<std::path::Path>) -> Result<Self, CatalogError> {
        use std::fs;

        let message_dir = messages_folder.as_ref();
        if !message_dir.exists() {
            return Err(
                CatalogError::Io(
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("{} folder not found", message_dir.display())
                    )
                )
            );
        }

        let mut langs = serde_json::Map::new();

        for folder_entry in fs::read_dir(message_dir)? {
            let folder = folder_entry?;
            if !folder.file_type()?.is_dir() {
                continue;
            }

            let lang_code = folder.file_name().to_string_lossy().to_string();
            let mut sections = serde_json::Map::new();

            for file_entry in fs::read_dir(folder.path())? {
                let path = file_entry?.path();
                if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let Some(section) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };

                let content = fs::read_to_string(&path)?;
                sections.insert(section.to_string(), serde_json::from_str(&content)?);
            }

            langs.insert(lang_code, Value::Object(sections));
        }

        Self::from_value(Value::Object(langs))
    }

    pub fn has_lang(&self, lang: &str) -> bool {
        self.langs.contains_key(lang)
    }

    /// Locale codes, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self.langs.keys().cloned().collect();
        langs.sort();
        langs
    }

    /// Walks a dot-separated path. Object segments are keys, array
    /// segments are decimal indices.
    pub fn resolve(&self, lang: &str, path: &str) -> Option<&Value> {
        let root = self.langs.get(lang)?;
        path.split('.').try_fold(root, |node, segment| {
            match node {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            }
        })
    }

    /// Text at `path`, or an empty string when nothing is there.
    pub fn text(&self, lang: &str, path: &str) -> String {
        match self.resolve(lang, path) {
            Some(value) => stringify(value),
            None => {
                if cfg!(debug_assertions) {
                    debug!("Missing translation '{}' for locale '{}'", path, lang);
                }
                String::new()
            }
        }
    }

    /// Items at `path` when it holds an array.
    pub fn list(&self, lang: &str, path: &str) -> Option<Vec<String>> {
        match self.resolve(lang, path)? {
            Value::Array(items) => Some(items.iter().map(stringify).collect()),
            _ => None,
        }
    }

    /// Every leaf key path of `lang`, array indices included.
    pub fn leaf_paths(&self, lang: &str) -> BTreeSet<String> {
        let mut paths = BTreeSet::new();
        if let Some(Value::Object(sections)) = self.langs.get(lang) {
            for (section, value) in sections {
                collect_leaves(section.clone(), value, &mut paths);
            }
        }
        paths
    }

    /// Paths that some locale defines and another lacks.
    pub fn missing_keys(&self) -> Vec<MissingKey> {
        let per_lang: Vec<(String, BTreeSet<String>)> = self
            .languages()
            .into_iter()
            .map(|lang| {
                let paths = self.leaf_paths(&lang);
                (lang, paths)
            })
            .collect();

        let all: BTreeSet<&String> = per_lang
            .iter()
            .flat_map(|(_, paths)| paths.iter())
            .collect();

        let mut missing = Vec::new();
        for (lang, paths) in &per_lang {
            for path in &all {
                if !paths.contains(*path) {
                    missing.push(MissingKey { lang: lang.clone(), path: (*path).clone() });
                }
            }
        }
        missing
    }
}

// Arrays join like a browser's Array#toString; objects have no text.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Null | Value::Object(_) => String::new(),
    }
}

fn collect_leaves(prefix: String, value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                collect_leaves(format!("{prefix}.{key}"), child, out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                collect_leaves(format!("{prefix}.{i}"), child, out);
            }
        }
        _ => {
            out.insert(prefix);
        }
    }
}

// ---------- Resource ----------

/// The active locale together with its catalog.
///
/// This is the single source of truth for "which language is the page in";
/// the translator writes it, the disclosure and contact systems read it.
#[derive(Resource, Debug)]
pub struct I18n {
    catalog: Catalog,
    current_lang: String,
}

impl FromWorld for I18n {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<SiteConfig>().cloned().unwrap_or_default();
        let catalog = if config.use_bundled_translations {
            load_bundled()
        } else {
            load_filesystem(&config.messages_folder)
        };

        for missing in catalog.missing_keys() {
            warn!("Locale '{}' has no translation for '{}'", missing.lang, missing.path);
        }

        Self::new(catalog, &config.default_lang)
    }
}

fn load_bundled() -> Catalog {
    Catalog::bundled().unwrap_or_else(|e| {
        error!("Failed to load bundled translations: {}", e);
        Catalog::default()
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn load_filesystem(messages_folder: &str) -> Catalog {
    match Catalog::from_dir(messages_folder) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("Failed to load translations from '{}': {}, using bundled ones", messages_folder, e);
            load_bundled()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn load_filesystem(_messages_folder: &str) -> Catalog {
    warn!("Filesystem loading not available on WASM, using bundled translations");
    load_bundled()
}

impl I18n {
    /// Starts in `default_lang`. A code the catalog does not know is replaced
    /// by `fr`, or by the first locale when there is no `fr` either.
    pub fn new(catalog: Catalog, default_lang: &str) -> Self {
        let current_lang = if catalog.has_lang(default_lang) {
            default_lang.to_string()
        } else {
            let fallback = if catalog.has_lang(FALLBACK_LANG) {
                Some(FALLBACK_LANG.to_string())
            } else {
                catalog.languages().into_iter().next()
            };
            match fallback {
                Some(lang) => {
                    warn!("Default locale '{}' is not in the catalog, using '{}'", default_lang, lang);
                    lang
                }
                None => default_lang.to_string(),
            }
        };
        Self { catalog, current_lang }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn get_lang(&self) -> &str {
        &self.current_lang
    }

    /// Switches the active locale. Unknown codes leave it unchanged and
    /// return `false`.
    pub fn set_lang(&mut self, lang: &str) -> bool {
        if !self.catalog.has_lang(lang) {
            return false;
        }
        self.current_lang = lang.to_string();
        true
    }

    pub fn available_languages(&self) -> Vec<String> {
        self.catalog.languages()
    }

    /// Text at `path` in the active locale.
    pub fn t(&self, path: &str) -> String {
        self.catalog.text(&self.current_lang, path)
    }

    pub fn list(&self, path: &str) -> Option<Vec<String>> {
        self.catalog.list(&self.current_lang, path)
    }
}
