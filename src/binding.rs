//! Markup markers that opt an element into translation.
//!
//! * [`I18nKey`] replaces the element's text with the string at a path.
//! * [`I18nList`] renders the array at a path as list items.
//! * [`I18nObject`] carries an inline descriptor, minimally
//!   `{"path": "<dot-path>"}`, parsed by [`ObjectBinding::parse`].

use std::fmt;

use bevy::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static KEY_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").unwrap()
});

/// Errors raised by the object binding parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The descriptor is not a JSON object with a string `path`.
    Syntax(String),
    /// `path` is empty or contains something other than dot-separated words.
    InvalidPath(String),
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(msg) => write!(f, "malformed binding descriptor: {msg}"),
            Self::InvalidPath(path) => write!(f, "invalid key path '{path}'"),
        }
    }
}

impl std::error::Error for BindingError {}

/// A validated dot-separated key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath(String);

impl KeyPath {
    pub fn parse(raw: &str) -> Result<Self, BindingError> {
        if KEY_PATH_RE.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(BindingError::InvalidPath(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
struct RawObjectBinding {
    path: String,
}

/// Parsed form of an [`I18nObject`] descriptor.
///
/// Unknown fields are accepted so descriptors can carry extra parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectBinding {
    pub path: KeyPath,
}

impl ObjectBinding {
    pub fn parse(raw: &str) -> Result<Self, BindingError> {
        let parsed: RawObjectBinding = serde_json
            ::from_str(raw)
            .map_err(|e| BindingError::Syntax(e.to_string()))?;
        Ok(Self { path: KeyPath::parse(&parsed.path)? })
    }
}

/// Text key: the element's text becomes the string at this path.
#[derive(Component, Debug, Clone)]
pub struct I18nKey(pub String);

impl I18nKey {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }
}

/// List key: the element's children are rebuilt from the array at this path.
#[derive(Component, Debug, Clone)]
pub struct I18nList(pub String);

impl I18nList {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }
}

/// Object key: raw inline descriptor, parsed on every translation pass.
#[derive(Component, Debug, Clone)]
pub struct I18nObject(pub String);

impl I18nObject {
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self(descriptor.into())
    }

    /// Descriptor pointing at `path`.
    pub fn path(path: &str) -> Self {
        Self(serde_json::json!({ "path": path }).to_string())
    }

    pub fn binding(&self) -> Result<ObjectBinding, BindingError> {
        ObjectBinding::parse(&self.0)
    }
}

/// A list item rendered by the translator under an [`I18nList`] element.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ListItem;
