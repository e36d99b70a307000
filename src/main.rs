use bevy::prelude::*;
use davicen_site::page::spawn_page;
use davicen_site::{ SiteConfig, SitePlugin };

fn main() -> AppExit {
    App::new()
        .add_plugins(
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Davicen".to_string(),
                    ..default()
                }),
                ..default()
            })
        )
        .add_plugins(SitePlugin::with_config(SiteConfig::from_env()))
        .add_systems(Startup, (spawn_camera, spawn_page))
        .run()
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
