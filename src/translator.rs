//! Page translator: applies a locale to every tagged entity and remembers it.

use bevy::prelude::*;

use crate::binding::{ I18nKey, I18nList, I18nObject, ListItem };
use crate::catalog::I18n;
use crate::store::LocaleStorage;

const ACTIVE_SWITCH: Color = Color::srgb(0.11, 0.32, 0.64);
const IDLE_SWITCH: Color = Color::srgb(0.82, 0.84, 0.88);

/// Request to switch the page to a locale. Unknown codes are ignored.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct SetLocale(pub String);

/// Locale selector control. Exactly the one matching the applied locale is
/// `active`.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct LangSwitch {
    pub lang: String,
    pub active: bool,
}

impl LangSwitch {
    pub fn new(lang: impl Into<String>) -> Self {
        Self { lang: lang.into(), active: false }
    }
}

pub struct TranslatorPlugin;

impl Plugin for TranslatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SetLocale>()
            .add_systems(Startup, restore_locale)
            .add_systems(Update, (lang_switch_clicks, apply_locale, paint_lang_switches).chain());
    }
}

/// Requests the persisted locale, or the starting locale of [`I18n`] when
/// nothing usable was persisted.
pub fn restore_locale(
    i18n: Res<I18n>,
    storage: Res<LocaleStorage>,
    mut requests: MessageWriter<SetLocale>
) {
    let stored = storage.load();
    let lang = match stored {
        Some(lang) if i18n.catalog().has_lang(&lang) => lang,
        Some(lang) => {
            warn!("Stored locale '{}' is not in the catalog, using '{}'", lang, i18n.get_lang());
            i18n.get_lang().to_string()
        }
        None => i18n.get_lang().to_string(),
    };
    info!("Restoring locale '{}'", lang);
    requests.write(SetLocale(lang));
}

pub fn lang_switch_clicks(
    switches: Query<(&Interaction, &LangSwitch), Changed<Interaction>>,
    mut requests: MessageWriter<SetLocale>
) {
    for (interaction, switch) in &switches {
        if *interaction == Interaction::Pressed {
            requests.write(SetLocale(switch.lang.clone()));
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn apply_locale(
    mut commands: Commands,
    mut requests: MessageReader<SetLocale>,
    mut i18n: ResMut<I18n>,
    storage: Res<LocaleStorage>,
    mut keyed: Query<(&I18nKey, &mut Text)>,
    mut objects: Query<(Entity, &I18nObject, &mut Text), Without<I18nKey>>,
    lists: Query<(Entity, &I18nList)>,
    mut switches: Query<&mut LangSwitch>
) {
    for SetLocale(lang) in requests.read() {
        if !i18n.catalog().has_lang(lang) {
            debug!("Ignoring unknown locale '{}'", lang);
            continue;
        }

        let catalog = i18n.catalog();

        for (key, mut text) in &mut keyed {
            text.0 = catalog.text(lang, &key.0);
        }

        for (entity, list) in &lists {
            if let Some(items) = catalog.list(lang, &list.0) {
                commands
                    .entity(entity)
                    .despawn_related::<Children>()
                    .with_children(|parent| {
                        for item in items {
                            parent.spawn((ListItem, Text::new(item)));
                        }
                    });
            }
        }

        for (entity, object, mut text) in &mut objects {
            match object.binding() {
                Ok(binding) => {
                    text.0 = catalog.text(lang, binding.path.as_str());
                }
                Err(e) => error!("Failed to parse i18n object config on {}: {}", entity, e),
            }
        }

        for mut switch in &mut switches {
            let active = switch.lang == *lang;
            if switch.active != active {
                switch.active = active;
            }
        }

        i18n.set_lang(lang);
        if let Err(e) = storage.save(lang) {
            warn!("Locale '{}' applied but not persisted: {}", lang, e);
        }
        info!("Applied locale '{}'", lang);
    }
}

pub fn paint_lang_switches(
    mut switches: Query<(&LangSwitch, &mut BackgroundColor), Changed<LangSwitch>>
) {
    for (switch, mut background) in &mut switches {
        background.0 = if switch.active { ACTIVE_SWITCH } else { IDLE_SWITCH };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ LocaleStore, MemoryLocaleStore };
    use crate::testing::{ self, MockTransport };
    use crate::SiteConfig;

    struct Page {
        home: Entity,
        list: Entity,
        title: Entity,
        broken: Entity,
        fr: Entity,
        en: Entity,
    }

    fn spawn_page(app: &mut App) -> Page {
        let world = app.world_mut();
        let home = world.spawn((I18nKey::new("nav.home"), Text::new(""))).id();
        let list = world.spawn((I18nList::new("expertise.items"), Node::default())).id();
        world.spawn((ListItem, Text::new("edited by hand"), ChildOf(list)));
        let title = world.spawn((I18nObject::path("carousel.0.title"), Text::new(""))).id();
        let broken = world.spawn((I18nObject::new("{path: nav.home"), Text::new("kept"))).id();
        let fr = world.spawn((LangSwitch::new("fr"), Interaction::None)).id();
        let en = world.spawn((LangSwitch::new("en"), Interaction::None)).id();
        Page { home, list, title, broken, fr, en }
    }

    fn list_items(app: &App, list: Entity) -> Vec<String> {
        let children: Vec<Entity> = app
            .world()
            .get::<Children>(list)
            .map(|children| children.to_vec())
            .unwrap_or_default();
        children
            .into_iter()
            .map(|child| testing::text(app, child))
            .collect()
    }

    fn active(app: &App, switch: Entity) -> bool {
        app.world().get::<LangSwitch>(switch).unwrap().active
    }

    #[test]
    fn startup_applies_the_default_locale() {
        let store = MemoryLocaleStore::new();
        let mut app = testing::app_with(store.clone(), MockTransport::answering(Some(200)));
        let page = spawn_page(&mut app);
        app.update();

        assert_eq!(testing::text(&app, page.home), "Accueil");
        assert_eq!(testing::text(&app, page.title), "Plateforme data temps réel");
        assert_eq!(list_items(&app, page.list), vec![
            "Développement d'application sur mesure",
            "Analyse de données et conseil",
            "Intégration d’IA",
            "Développement d’IA à partir de vos données",
        ]);
        assert!(active(&app, page.fr));
        assert!(!active(&app, page.en));
        assert_eq!(app.world().resource::<I18n>().get_lang(), "fr");
        assert_eq!(store.load(), Some("fr".to_string()));
    }

    #[test]
    fn malformed_object_config_leaves_text_alone() {
        let mut app = testing::app();
        let page = spawn_page(&mut app);
        app.update();
        assert_eq!(testing::text(&app, page.broken), "kept");
    }

    #[test]
    fn switching_rewrites_everything_and_persists() {
        let store = MemoryLocaleStore::new();
        let mut app = testing::app_with(store.clone(), MockTransport::answering(Some(200)));
        let page = spawn_page(&mut app);
        app.update();

        app.world_mut().write_message(SetLocale("en".into()));
        app.update();

        assert_eq!(testing::text(&app, page.home), "Home");
        assert_eq!(testing::text(&app, page.title), "Real-time data platform");
        assert_eq!(list_items(&app, page.list).len(), 4);
        assert_eq!(list_items(&app, page.list)[0], "Custom application development");
        assert!(active(&app, page.en));
        assert!(!active(&app, page.fr));
        assert_eq!(store.load(), Some("en".to_string()));
    }

    #[test]
    fn unknown_locale_is_a_no_op() {
        let store = MemoryLocaleStore::new();
        let mut app = testing::app_with(store.clone(), MockTransport::answering(Some(200)));
        let page = spawn_page(&mut app);
        app.update();

        app.world_mut().write_message(SetLocale("de".into()));
        app.update();

        assert_eq!(testing::text(&app, page.home), "Accueil");
        assert!(active(&app, page.fr));
        assert_eq!(app.world().resource::<I18n>().get_lang(), "fr");
        assert_eq!(store.load(), Some("fr".to_string()));
    }

    #[test]
    fn pressing_a_switch_applies_its_locale() {
        let mut app = testing::app();
        let page = spawn_page(&mut app);
        app.update();

        *app.world_mut().get_mut::<Interaction>(page.en).unwrap() = Interaction::Pressed;
        app.update();

        assert_eq!(testing::text(&app, page.home), "Home");
        assert_eq!(app.world().resource::<I18n>().get_lang(), "en");
    }

    #[test]
    fn persisted_locale_survives_a_reload() {
        let store = MemoryLocaleStore::new();

        let mut first = testing::app_with(store.clone(), MockTransport::answering(Some(200)));
        spawn_page(&mut first);
        first.update();
        first.world_mut().write_message(SetLocale("en".into()));
        first.update();
        drop(first);

        let mut reloaded = testing::app_with(store, MockTransport::answering(Some(200)));
        let page = spawn_page(&mut reloaded);
        reloaded.update();

        assert_eq!(reloaded.world().resource::<I18n>().get_lang(), "en");
        assert_eq!(testing::text(&reloaded, page.home), "Home");
        assert!(active(&reloaded, page.en));
    }

    #[test]
    fn unknown_stored_locale_falls_back_to_the_default() {
        let store = MemoryLocaleStore::with_value("de");
        let mut app = testing::app_with(store.clone(), MockTransport::answering(Some(200)));
        let page = spawn_page(&mut app);
        app.update();

        assert_eq!(app.world().resource::<I18n>().get_lang(), "fr");
        assert_eq!(testing::text(&app, page.home), "Accueil");
        assert_eq!(list_items(&app, page.list).len(), 4);
        assert!(active(&app, page.fr));
        assert_eq!(store.load(), Some("fr".to_string()));
    }

    #[test]
    fn unknown_configured_default_still_translates_the_page() {
        let mut app = testing::app_with_config(
            SiteConfig { default_lang: "de".into(), ..testing::config() },
            MemoryLocaleStore::new(),
            MockTransport::answering(Some(200))
        );
        let page = spawn_page(&mut app);
        app.update();

        assert_eq!(app.world().resource::<I18n>().get_lang(), "fr");
        assert_eq!(testing::text(&app, page.home), "Accueil");
        assert_eq!(testing::text(&app, page.title), "Plateforme data temps réel");
    }
}
