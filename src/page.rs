//! The Davicen page, laid out with the translation markers.
//!
//! Text is spawned empty; the first locale pass fills it in. Slide, panel
//! and team member counts follow the catalog of the active locale.

use bevy::prelude::*;

use crate::binding::{ I18nKey, I18nList, I18nObject };
use crate::carousel::{ CarouselButton, CarouselTrack, Step };
use crate::catalog::I18n;
use crate::contact::{ ContactForm, FormField, FormStatus, SubmitButton };
use crate::disclosure::{ Disclosure, DisclosureBody, DisclosureLabel };
use crate::translator::LangSwitch;
use crate::SiteConfig;

const PAGE_BG: Color = Color::srgb(0.97, 0.97, 0.98);
const PANEL_BG: Color = Color::WHITE;
const FIELD_BG: Color = Color::srgb(0.93, 0.94, 0.96);
const BUTTON_BG: Color = Color::srgb(0.11, 0.32, 0.64);
const INK: Color = Color::srgb(0.09, 0.1, 0.13);
const MUTED: Color = Color::srgb(0.35, 0.37, 0.42);
const ON_BUTTON: Color = Color::WHITE;

const TEXT_FIELDS: [(&str, &str); 4] = [
    ("name", "contact.fields.name"),
    ("email", "contact.fields.email"),
    ("company", "contact.fields.company"),
    ("message", "contact.fields.message"),
];

pub fn spawn_page(mut commands: Commands, config: Res<SiteConfig>, i18n: Res<I18n>) {
    let root = commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(24.0)),
                row_gap: Val::Px(16.0),
                ..default()
            },
            BackgroundColor(PAGE_BG),
        ))
        .id();

    spawn_header(&mut commands, root, &i18n);
    spawn_hero(&mut commands, root);

    let columns = commands
        .spawn((
            Node {
                flex_direction: FlexDirection::Row,
                column_gap: Val::Px(16.0),
                flex_grow: 1.0,
                ..default()
            },
            ChildOf(root),
        ))
        .id();
    let left = column(&mut commands, columns);
    let right = column(&mut commands, columns);

    spawn_expertise(&mut commands, left);
    spawn_team(&mut commands, left, &i18n);
    spawn_projects(&mut commands, right, &i18n);
    spawn_contact(&mut commands, right, &config);
    spawn_footer(&mut commands, root);
}

fn count(i18n: &I18n, path: &str) -> usize {
    i18n.list(path).map_or(0, |items| items.len())
}

fn column(commands: &mut Commands, parent: Entity) -> Entity {
    commands
        .spawn((
            Node {
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(16.0),
                flex_basis: Val::Percent(50.0),
                ..default()
            },
            ChildOf(parent),
        ))
        .id()
}

fn section(commands: &mut Commands, parent: Entity, title_key: &str) -> Entity {
    let section = commands
        .spawn((
            Node {
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                padding: UiRect::all(Val::Px(12.0)),
                ..default()
            },
            BackgroundColor(PANEL_BG),
            ChildOf(parent),
        ))
        .id();
    keyed_text(commands, section, title_key, 22.0, INK);
    section
}

fn keyed_text(commands: &mut Commands, parent: Entity, key: &str, size: f32, color: Color) -> Entity {
    commands
        .spawn((
            I18nKey::new(key),
            Text::new(""),
            TextFont { font_size: size, ..default() },
            TextColor(color),
            ChildOf(parent),
        ))
        .id()
}

fn object_text(commands: &mut Commands, parent: Entity, path: &str, size: f32, color: Color) -> Entity {
    commands
        .spawn((
            I18nObject::path(path),
            Text::new(""),
            TextFont { font_size: size, ..default() },
            TextColor(color),
            ChildOf(parent),
        ))
        .id()
}

fn button(commands: &mut Commands, parent: Entity) -> Entity {
    commands
        .spawn((
            Button,
            Node {
                padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(BUTTON_BG),
            ChildOf(parent),
        ))
        .id()
}

fn spawn_header(commands: &mut Commands, root: Entity, i18n: &I18n) {
    let header = commands
        .spawn((
            Node {
                flex_direction: FlexDirection::Row,
                align_items: AlignItems::Center,
                column_gap: Val::Px(20.0),
                ..default()
            },
            ChildOf(root),
        ))
        .id();

    keyed_text(commands, header, "site.brand", 28.0, INK);
    for key in ["nav.home", "nav.expertise", "nav.projects", "nav.team_contact"] {
        keyed_text(commands, header, key, 16.0, MUTED);
    }

    for lang in i18n.available_languages() {
        let switch = button(commands, header);
        commands.entity(switch).insert(LangSwitch::new(lang.clone()));
        commands.spawn((
            Text::new(lang.to_uppercase()),
            TextFont { font_size: 14.0, ..default() },
            TextColor(ON_BUTTON),
            ChildOf(switch),
        ));
    }
}

fn spawn_hero(commands: &mut Commands, root: Entity) {
    let hero = commands
        .spawn((
            Node {
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(10.0),
                ..default()
            },
            ChildOf(root),
        ))
        .id();

    keyed_text(commands, hero, "hero.kicker", 14.0, MUTED);
    keyed_text(commands, hero, "hero.headline", 36.0, INK);

    let actions = commands
        .spawn((
            Node { flex_direction: FlexDirection::Row, column_gap: Val::Px(12.0), ..default() },
            ChildOf(hero),
        ))
        .id();
    for key in ["hero.cta_primary", "hero.cta_secondary"] {
        let cta = button(commands, actions);
        keyed_text(commands, cta, key, 16.0, ON_BUTTON);
    }
}

fn spawn_expertise(commands: &mut Commands, parent: Entity) {
    let section = section(commands, parent, "expertise.title");
    commands.spawn((
        I18nList::new("expertise.items"),
        Node {
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(4.0),
            ..default()
        },
        ChildOf(section),
    ));
}

fn spawn_team(commands: &mut Commands, parent: Entity, i18n: &I18n) {
    let section = section(commands, parent, "team.title");
    for i in 0..count(i18n, "team.members") {
        object_text(commands, section, &format!("team.members.{i}.role"), 16.0, MUTED);
    }
}

fn spawn_projects(commands: &mut Commands, parent: Entity, i18n: &I18n) {
    let section = section(commands, parent, "projects.title");
    let slides = count(i18n, "carousel");

    let viewport = commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                overflow: Overflow::clip(),
                ..default()
            },
            ChildOf(section),
        ))
        .id();
    let track = commands
        .spawn((
            CarouselTrack,
            Node {
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Row,
                position_type: PositionType::Relative,
                ..default()
            },
            ChildOf(viewport),
        ))
        .id();

    for i in 0..slides {
        let slide = commands
            .spawn((
                Node {
                    width: Val::Percent(100.0),
                    min_width: Val::Percent(100.0),
                    flex_shrink: 0.0,
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(6.0),
                    padding: UiRect::all(Val::Px(8.0)),
                    ..default()
                },
                ChildOf(track),
            ))
            .id();
        object_text(commands, slide, &format!("carousel.{i}.title"), 18.0, INK);
        object_text(commands, slide, &format!("carousel.{i}.details"), 14.0, MUTED);
    }

    let controls = commands
        .spawn((
            Node { flex_direction: FlexDirection::Row, column_gap: Val::Px(8.0), ..default() },
            ChildOf(section),
        ))
        .id();
    for (step, glyph) in [(Step::Prev, "<"), (Step::Next, ">")] {
        let control = button(commands, controls);
        commands.entity(control).insert(CarouselButton { track, step });
        commands.spawn((Text::new(glyph), TextColor(ON_BUTTON), ChildOf(control)));
    }

    for i in 0..slides {
        let panel = commands
            .spawn((
                Button,
                Disclosure::default(),
                Node {
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(4.0),
                    padding: UiRect::all(Val::Px(8.0)),
                    ..default()
                },
                BackgroundColor(FIELD_BG),
                ChildOf(section),
            ))
            .id();
        object_text(commands, panel, &format!("carousel.{i}.title"), 16.0, INK);
        commands.spawn((
            DisclosureLabel,
            Text::new(""),
            TextFont { font_size: 14.0, ..default() },
            TextColor(BUTTON_BG),
            ChildOf(panel),
        ));
        let body = commands
            .spawn((DisclosureBody, Node { display: Display::None, ..default() }, ChildOf(panel)))
            .id();
        object_text(commands, body, &format!("carousel.{i}.details"), 14.0, MUTED);
    }
}

fn spawn_contact(commands: &mut Commands, parent: Entity, config: &SiteConfig) {
    let section = section(commands, parent, "contact.title");
    keyed_text(commands, section, "contact.desc", 14.0, MUTED);

    let status = commands
        .spawn((Text::new(""), FormStatus::default(), TextFont { font_size: 14.0, ..default() }, TextColor(MUTED)))
        .id();
    let form = commands
        .spawn((
            ContactForm { endpoint: config.contact_endpoint.clone(), status },
            Node {
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(6.0),
                ..default()
            },
            ChildOf(section),
        ))
        .id();

    for (name, label_key) in TEXT_FIELDS {
        keyed_text(commands, form, label_key, 14.0, INK);
        commands.spawn((
            Button,
            FormField::text(form, name),
            Text::new(""),
            TextFont { font_size: 14.0, ..default() },
            TextColor(INK),
            Node {
                min_height: Val::Px(24.0),
                padding: UiRect::all(Val::Px(4.0)),
                ..default()
            },
            BackgroundColor(FIELD_BG),
            ChildOf(form),
        ));
    }

    let consent = commands
        .spawn((
            Node { flex_direction: FlexDirection::Row, column_gap: Val::Px(8.0), ..default() },
            ChildOf(form),
        ))
        .id();
    commands.spawn((
        Button,
        FormField::checkbox(form, "consent"),
        Text::new("[ ]"),
        TextColor(INK),
        ChildOf(consent),
    ));
    keyed_text(commands, consent, "contact.fields.consent", 14.0, INK);

    let submit = button(commands, form);
    commands.entity(submit).insert(SubmitButton { form });
    keyed_text(commands, submit, "contact.submit", 16.0, ON_BUTTON);

    commands.entity(status).insert(ChildOf(form));
}

fn spawn_footer(commands: &mut Commands, root: Entity) {
    let footer = commands
        .spawn((
            Node { flex_direction: FlexDirection::Row, column_gap: Val::Px(16.0), ..default() },
            ChildOf(root),
        ))
        .id();
    for key in ["footer.legal", "footer.privacy", "footer.terms", "footer.language"] {
        keyed_text(commands, footer, key, 12.0, MUTED);
    }
}
