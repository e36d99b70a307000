//! Expandable project panels.

use bevy::prelude::*;

use crate::catalog::I18n;
use crate::translator::apply_locale;

/// Pressable panel. Its [`DisclosureLabel`] children read "collapse" while
/// open and "learn more" while closed; its [`DisclosureBody`] children are
/// only displayed while open.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Disclosure {
    pub open: bool,
}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct DisclosureLabel;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct DisclosureBody;

pub struct DisclosurePlugin;

impl Plugin for DisclosurePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (toggle_disclosures, sync_disclosures).chain().after(apply_locale)
        );
    }
}

/// Label for a panel in the active locale.
pub fn disclosure_label(i18n: &I18n, open: bool) -> String {
    i18n.t(if open { "projects.collapse" } else { "projects.learn_more" })
}

pub fn toggle_disclosures(
    mut panels: Query<(&Interaction, &mut Disclosure), Changed<Interaction>>
) {
    for (interaction, mut disclosure) in &mut panels {
        if *interaction == Interaction::Pressed {
            disclosure.open = !disclosure.open;
        }
    }
}

/// Relabels panels whose state changed, or all of them after a locale switch.
pub fn sync_disclosures(
    i18n: Res<I18n>,
    panels: Query<Ref<Disclosure>>,
    mut labels: Query<(&ChildOf, &mut Text), With<DisclosureLabel>>,
    mut bodies: Query<(&ChildOf, &mut Node), With<DisclosureBody>>
) {
    let locale_changed = i18n.is_changed();

    for (child_of, mut text) in &mut labels {
        let Ok(disclosure) = panels.get(child_of.parent()) else {
            continue;
        };
        if locale_changed || disclosure.is_changed() {
            text.0 = disclosure_label(&i18n, disclosure.open);
        }
    }

    for (child_of, mut node) in &mut bodies {
        let Ok(disclosure) = panels.get(child_of.parent()) else {
            continue;
        };
        if disclosure.is_changed() {
            node.display = if disclosure.open { Display::Flex } else { Display::None };
        }
    }
}
