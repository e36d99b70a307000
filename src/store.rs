//! Durable slot for the chosen locale.

use std::fmt;
use std::path::{ Path, PathBuf };
use std::sync::{ Arc, Mutex };

use bevy::prelude::*;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot persist locale: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// One key-value pair that survives restarts.
pub trait LocaleStore: Send + Sync + 'static {
    fn load(&self) -> Option<String>;
    fn save(&self, lang: &str) -> Result<(), StoreError>;
}

/// Stores the locale in a file named after the storage key.
#[derive(Debug, Clone)]
pub struct FileLocaleStore {
    path: PathBuf,
}

impl FileLocaleStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self { path: dir.as_ref().join(key) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocaleStore for FileLocaleStore {
    fn load(&self) -> Option<String> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let lang = raw.trim();
        (!lang.is_empty()).then(|| lang.to_string())
    }

    fn save(&self, lang: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, lang)?;
        Ok(())
    }
}

/// In-process store. Clones share the same slot, which lets a second app
/// observe what a first one saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocaleStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryLocaleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(lang: &str) -> Self {
        Self { slot: Arc::new(Mutex::new(Some(lang.to_string()))) }
    }
}

impl LocaleStore for MemoryLocaleStore {
    fn load(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    fn save(&self, lang: &str) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(lang.to_string());
        Ok(())
    }
}

/// Resource wrapping the configured [`LocaleStore`].
#[derive(Resource)]
pub struct LocaleStorage(pub Box<dyn LocaleStore>);

impl LocaleStorage {
    pub fn new(store: impl LocaleStore) -> Self {
        Self(Box::new(store))
    }

    pub fn load(&self) -> Option<String> {
        self.0.load()
    }

    pub fn save(&self, lang: &str) -> Result<(), StoreError> {
        self.0.save(lang)
    }
}
