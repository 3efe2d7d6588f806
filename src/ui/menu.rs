//! Destinations menu.
//!
//! A keyboard-driven list of every navigation target. Opening it releases
//! the pointer and silences movement input; picking an entry selects that
//! target and hands the pointer back. The list is rendered as one text
//! block rebuilt from the registry while the menu is open.

use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::nav::TargetRegistry;
use crate::settings::Settings;

/// Whether the destinations menu is open and which row is highlighted.
#[derive(Resource, Default)]
pub struct MenuState {
    pub open: bool,
    pub cursor: usize,
}

/// Marks the menu's backing panel.
#[derive(Component)]
pub struct MenuPanel;

/// Marks the menu's text block.
#[derive(Component)]
pub struct MenuText;

/// Spawn the destinations panel, hidden until opened.
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_destinations_menu(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font_handle: Handle<Font> = asset_server.load("fonts/OpenSans.ttf");

    commands
        .spawn((
            MenuPanel,
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    left: Val::Px(40.0),
                    top: Val::Px(80.0),
                    padding: UiRect::all(Val::Px(14.0)),
                    flex_direction: FlexDirection::Column,
                    ..default()
                },
                background_color: Color::srgba(0.0, 0.0, 0.0, 0.65).into(),
                visibility: Visibility::Hidden,
                ..default()
            },
        ))
        .with_children(|p| {
            p.spawn((
                TextBundle {
                    text: Text::from_section(
                        "",
                        TextStyle {
                            font: font_handle,
                            font_size: 20.0,
                            color: Color::WHITE,
                        },
                    ),
                    ..default()
                },
                MenuText,
            ));
        });
}

/// Open and close the menu. Opening hands the pointer back, closing locks
/// it again for mouse look. Escape closes without re-locking.
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_destinations_menu(
    keyboard: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    registry: Option<Res<TargetRegistry>>,
    mut menu: ResMut<MenuState>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let toggle = settings.controls.key("destinations", KeyCode::KeyF);

    if keyboard.just_pressed(toggle) {
        menu.open = !menu.open;
        let Ok(mut window) = windows.get_single_mut() else { return };
        if menu.open {
            // start the cursor on the active selection when there is one
            menu.cursor = registry
                .as_ref()
                .and_then(|r| {
                    let key = r.selected_key()?;
                    r.targets.iter().position(|t| t.key == key)
                })
                .unwrap_or(0);
            window.cursor.grab_mode = CursorGrabMode::None;
            window.cursor.visible = true;
        } else {
            window.cursor.grab_mode = CursorGrabMode::Locked;
            window.cursor.visible = false;
        }
    } else if menu.open && keyboard.just_pressed(KeyCode::Escape) {
        menu.open = false;
    }
}

/// Keyboard navigation inside the open menu: arrows move, Enter selects.
#[allow(clippy::needless_pass_by_value)]
pub fn navigate_destinations_menu(
    keyboard: Res<ButtonInput<KeyCode>>,
    registry: Option<ResMut<TargetRegistry>>,
    mut menu: ResMut<MenuState>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if !menu.open {
        return;
    }
    let Some(mut registry) = registry else { return };
    if registry.is_empty() {
        return;
    }
    let rows = registry.len();
    menu.cursor = menu.cursor.min(rows - 1);

    if keyboard.just_pressed(KeyCode::ArrowDown) {
        menu.cursor = (menu.cursor + 1) % rows;
    }
    if keyboard.just_pressed(KeyCode::ArrowUp) {
        menu.cursor = (menu.cursor + rows - 1) % rows;
    }

    if keyboard.just_pressed(KeyCode::Enter) {
        registry.select_index(menu.cursor);
        menu.open = false;
        if let Ok(mut window) = windows.get_single_mut() {
            window.cursor.grab_mode = CursorGrabMode::Locked;
            window.cursor.visible = false;
        }
    }
}

/// Drop the active target. Works with the menu open or closed.
#[allow(clippy::needless_pass_by_value)]
pub fn clear_target_selection(
    keyboard: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    registry: Option<ResMut<TargetRegistry>>,
) {
    if !keyboard.just_pressed(settings.controls.key("clear_target", KeyCode::KeyB)) {
        return;
    }
    if let Some(mut registry) = registry {
        registry.clear_selection();
    }
}

/// Render the menu: hidden panel when closed, otherwise the destination
/// list with the cursor row marked and the active target tagged.
#[allow(clippy::needless_pass_by_value)]
pub fn update_destinations_menu(
    menu: Res<MenuState>,
    registry: Option<Res<TargetRegistry>>,
    mut panels: Query<&mut Visibility, With<MenuPanel>>,
    mut texts: Query<&mut Text, With<MenuText>>,
) {
    let Ok(mut visibility) = panels.get_single_mut() else { return };
    if !menu.open {
        *visibility = Visibility::Hidden;
        return;
    }
    *visibility = Visibility::Visible;

    let Ok(mut text) = texts.get_single_mut() else { return };

    let Some(registry) = registry else {
        text.sections[0].value = "Destinations\n\nstill loading...".to_string();
        return;
    };
    if registry.is_empty() {
        text.sections[0].value = "Destinations\n\nnothing to list".to_string();
        return;
    }

    let selected_key = registry.selected_key().map(str::to_string);
    let mut listing = String::from("Destinations\n\n");
    for (i, target) in registry.targets.iter().enumerate() {
        let marker = if i == menu.cursor { "> " } else { "  " };
        let active = if selected_key.as_deref() == Some(target.key.as_str()) {
            "  [active]"
        } else {
            ""
        };
        listing.push_str(&format!("{marker}{}{active}\n", target.label));
    }
    listing.push_str("\nEnter go | B clear | Esc close");
    text.sections[0].value = listing;
}
