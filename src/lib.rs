#![doc = include_str!("../README.md")]

//! # davicen-site
//!
//! Front-end behaviour of the Davicen site as a [Bevy](https://bevyengine.org/) plugin:
//!
//! - **Translation**: entities tagged with [`I18nKey`], [`I18nList`] or [`I18nObject`]
//!   are rewritten whenever a [`SetLocale`] message is handled
//! - **Persistence**: the chosen locale is saved under `davicen_lang` and restored at startup
//! - **Carousel**: wrap-around slide cursor driven by buttons and a repeating timer
//! - **Disclosures**: "learn more" / "collapse" panels
//! - **Contact form**: one multipart POST per submission, localized outcome message

use std::path::PathBuf;
use std::time::Duration;

use bevy::prelude::*;

pub mod binding;
pub mod carousel;
pub mod catalog;
pub mod contact;
pub mod disclosure;
pub mod page;
pub mod store;
pub mod translator;

pub use binding::{ BindingError, I18nKey, I18nList, I18nObject, KeyPath, ListItem, ObjectBinding };
pub use carousel::{ Carousel, CarouselButton, CarouselPlugin, CarouselStep, CarouselTrack, Step };
pub use catalog::{ Catalog, CatalogError, I18n, MissingKey };
pub use contact::{
    ContactClient,
    ContactForm,
    ContactPlugin,
    ContactTransport,
    FieldValue,
    FormField,
    FormStatus,
    HttpTransport,
    StatusClass,
    SubmitButton,
    SubmitContact,
    TransportError,
};
pub use disclosure::{ Disclosure, DisclosureBody, DisclosureLabel, DisclosurePlugin };
pub use store::{ FileLocaleStore, LocaleStorage, LocaleStore, MemoryLocaleStore, StoreError };
pub use translator::{ LangSwitch, SetLocale, TranslatorPlugin };

/// Configuration for the site plugin.
///
/// # Example
///
/// ```
/// use davicen_site::SiteConfig;
///
/// let config = SiteConfig {
///     default_lang: "en".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.storage_key, "davicen_lang");
/// ```
#[derive(Debug, Clone, Resource)]
pub struct SiteConfig {
    /// Whether to use the translations bundled at build time (true) or read
    /// `messages_folder` at runtime (false).
    /// Automatically `true` for WASM targets or with the `bundle-only` feature.
    pub use_bundled_translations: bool,
    /// Folder holding `<lang>/<section>.json` files.
    /// Default: "messages"
    pub messages_folder: String,
    /// Locale used when nothing was persisted.
    /// Default: "fr"
    pub default_lang: String,
    /// Key under which the chosen locale is persisted.
    pub storage_key: String,
    /// Directory of the file-backed locale store.
    pub storage_dir: PathBuf,
    /// Carousel autoplay period.
    pub autoplay_interval: Duration,
    /// Target of the contact form POST.
    pub contact_endpoint: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            use_bundled_translations: cfg!(target_arch = "wasm32") || cfg!(feature = "bundle-only"),
            messages_folder: "messages".to_string(),
            default_lang: "fr".to_string(),
            storage_key: "davicen_lang".to_string(),
            storage_dir: PathBuf::from(".davicen"),
            autoplay_interval: Duration::from_millis(5500),
            contact_endpoint: "http://127.0.0.1:8080/api/contact".to_string(),
        }
    }
}

impl SiteConfig {
    /// Defaults overridden by `DAVICEN_CONTACT_ENDPOINT`, `DAVICEN_STATE_DIR`
    /// and `DAVICEN_LANG` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var("DAVICEN_CONTACT_ENDPOINT") {
            config.contact_endpoint = endpoint;
        }
        if let Ok(dir) = std::env::var("DAVICEN_STATE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Ok(lang) = std::env::var("DAVICEN_LANG") {
            config.default_lang = lang;
        }
        config
    }
}

// ---------- Bevy Plugin ----------

/// Installs the catalog, the locale store, the contact transport and every
/// behaviour plugin.
///
/// A [`LocaleStorage`] or [`ContactClient`] inserted before this plugin is
/// kept; otherwise a file store under `storage_dir` and an HTTP transport
/// are used.
#[derive(Default)]
pub struct SitePlugin {
    pub config: SiteConfig,
}

impl SitePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SiteConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SitePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone());

        if !app.world().contains_resource::<LocaleStorage>() {
            app.insert_resource(
                LocaleStorage::new(
                    FileLocaleStore::new(&self.config.storage_dir, &self.config.storage_key)
                )
            );
        }
        if !app.world().contains_resource::<ContactClient>() {
            app.insert_resource(ContactClient::new(HttpTransport::new()));
        }

        app.init_resource::<I18n>().add_plugins((
            TranslatorPlugin,
            CarouselPlugin,
            DisclosurePlugin,
            ContactPlugin,
        ));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{ Arc, Mutex };

    use bevy::prelude::*;
    use bevy::tasks::{ IoTaskPool, TaskPool };

    use super::*;

    pub type Posted = Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>;

    /// Answers every POST with a fixed status, or fails when `status` is `None`.
    #[derive(Clone)]
    pub struct MockTransport {
        pub status: Option<u16>,
        pub posted: Posted,
    }

    impl MockTransport {
        pub fn answering(status: Option<u16>) -> Self {
            Self { status, posted: Arc::default() }
        }
    }

    impl ContactTransport for MockTransport {
        fn post(&self, endpoint: &str, fields: &[(String, String)]) -> Result<u16, TransportError> {
            self.posted.lock().unwrap().push((endpoint.to_string(), fields.to_vec()));
            self.status.ok_or_else(|| TransportError::Other("connection refused".into()))
        }
    }

    pub fn config() -> SiteConfig {
        SiteConfig {
            use_bundled_translations: true,
            ..Default::default()
        }
    }

    /// Headless app: in-memory store, mock transport and a manually advanced
    /// clock.
    pub fn app_with_config<T: ContactTransport>(
        config: SiteConfig,
        store: MemoryLocaleStore,
        transport: T
    ) -> App {
        IoTaskPool::get_or_init(TaskPool::new);

        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(LocaleStorage::new(store))
            .insert_resource(ContactClient::new(transport))
            .add_plugins(SitePlugin::with_config(config));
        app
    }

    pub fn app_with<T: ContactTransport>(store: MemoryLocaleStore, transport: T) -> App {
        app_with_config(config(), store, transport)
    }

    pub fn app() -> App {
        app_with(MemoryLocaleStore::new(), MockTransport::answering(Some(200)))
    }

    pub fn text(app: &App, entity: Entity) -> String {
        app.world().get::<Text>(entity).map(|t| t.0.clone()).unwrap_or_default()
    }
}
