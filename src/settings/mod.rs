//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! using the existing RON watcher utilities (see `ron::setup_ron_watcher`).
use bevy::prelude::{Resource, KeyCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsSettings {
    #[serde(default = "GraphicsSettings::default_vsync")]
    pub vsync: bool, // Enable vertical sync to cap FPS to the display refresh rate.
    #[serde(default = "GraphicsSettings::default_fov")]
    pub fov_degrees: f32, // Vertical field of view of the walkthrough camera, in degrees.
    #[serde(default = "GraphicsSettings::default_shadows")]
    pub shadows: bool, // Enable/disable directional light shadows
}

impl GraphicsSettings {
    fn default_vsync() -> bool { true }
    fn default_fov() -> f32 { 60.0 }
    fn default_shadows() -> bool { true }
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            vsync: Self::default_vsync(),
            fov_degrees: Self::default_fov(),
            shadows: Self::default_shadows(),
        }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default)]
    pub invert_y: bool, // Invert mouse Y axis
    #[serde(default)]
    pub invert_x: bool, // Invert mouse X axis
    #[serde(default = "ControlsSettings::default_sensitivity")]
    pub mouse_sensitivity: f32, // Mouse sensitivity multiplier
    #[serde(default = "ControlsSettings::default_touch_look_sensitivity")]
    pub touch_look_sensitivity: f32, // Look-drag sensitivity multiplier for the touch zone
    #[serde(default = "ControlsSettings::default_joystick_radius")]
    pub joystick_radius: f32, // Radius of the virtual joystick travel, in logical pixels
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Map of action names to key identifiers (editable by user)
}

impl ControlsSettings {
    fn default_sensitivity() -> f32 { 1.0 }
    fn default_touch_look_sensitivity() -> f32 { 2.5 }
    fn default_joystick_radius() -> f32 { 80.0 }

    fn default_keybinds() -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("forward".to_string(), "W".to_string());
        m.insert("back".to_string(), "S".to_string());
        m.insert("left".to_string(), "A".to_string());
        m.insert("right".to_string(), "D".to_string());
        m.insert("jump".to_string(), "Space".to_string());
        m.insert("sprint".to_string(), "LShift".to_string());
        m.insert("crouch".to_string(), "LCtrl".to_string());
        m.insert("interact".to_string(), "E".to_string());
        m.insert("destinations".to_string(), "F".to_string());
        m.insert("clear_target".to_string(), "B".to_string());
        m.insert("retry_load".to_string(), "R".to_string());
        m.insert("toggle_debug".to_string(), "F1".to_string());
        m.insert("toggle_bounds".to_string(), "F2".to_string());
        m.insert("dump_debug".to_string(), "F3".to_string());
        m
    }

    /// Look up a bound key by action name, falling back to `default` when the
    /// action is unbound or names an unknown key.
    #[must_use]
    pub fn key(&self, action: &str, default: KeyCode) -> KeyCode {
        self.keybinds
            .get(action)
            .and_then(|s| Settings::keycode_from_str(s))
            .unwrap_or(default)
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            invert_y: false,
            invert_x: false,
            mouse_sensitivity: Self::default_sensitivity(),
            touch_look_sensitivity: Self::default_touch_look_sensitivity(),
            joystick_radius: Self::default_joystick_radius(),
            keybinds: Self::default_keybinds(),
        }
    }
}

/// Movement and grounding tuning.
///
/// The defaults reproduce the walkthrough feel the campus model was authored
/// against: eye height 1.6 m, walk 6 m/s with a 2x sprint, jump impulse 5.5
/// and gravity 15.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementSettings {
    #[serde(default = "MovementSettings::default_walk_speed")]
    pub walk_speed: f32, // Base horizontal speed, world units per second
    #[serde(default = "MovementSettings::default_sprint_multiplier")]
    pub sprint_multiplier: f32, // Speed factor while the sprint key is held
    #[serde(default = "MovementSettings::default_crouch_multiplier")]
    pub crouch_multiplier: f32, // Speed factor while crouched
    #[serde(default = "MovementSettings::default_jump_impulse")]
    pub jump_impulse: f32, // Upward velocity applied on jump
    #[serde(default = "MovementSettings::default_gravity")]
    pub gravity: f32, // Downward acceleration while airborne
    #[serde(default = "MovementSettings::default_max_fall_speed")]
    pub max_fall_speed: f32, // Terminal fall speed clamp
    #[serde(default = "MovementSettings::default_eye_height")]
    pub eye_height: f32, // Camera height above the floor while standing
    #[serde(default = "MovementSettings::default_crouch_eye_height")]
    pub crouch_eye_height: f32, // Camera height above the floor while crouched
    #[serde(default = "MovementSettings::default_step_height")]
    pub step_height: f32, // Largest floor rise climbed without going airborne
    #[serde(default = "MovementSettings::default_probe_length")]
    pub probe_length: f32, // Maximum downward ray length for the ground probe
    #[serde(default = "MovementSettings::default_interact_distance")]
    pub interact_distance: f32, // Maximum distance at which doors respond to interact
}

impl MovementSettings {
    fn default_walk_speed() -> f32 { 6.0 }
    fn default_sprint_multiplier() -> f32 { 2.0 }
    fn default_crouch_multiplier() -> f32 { 0.5 }
    fn default_jump_impulse() -> f32 { 5.5 }
    fn default_gravity() -> f32 { 15.0 }
    fn default_max_fall_speed() -> f32 { 50.0 }
    fn default_eye_height() -> f32 { 1.6 }
    fn default_crouch_eye_height() -> f32 { 1.0 }
    fn default_step_height() -> f32 { 0.45 }
    fn default_probe_length() -> f32 { 60.0 }
    fn default_interact_distance() -> f32 { 3.0 }
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            walk_speed: Self::default_walk_speed(),
            sprint_multiplier: Self::default_sprint_multiplier(),
            crouch_multiplier: Self::default_crouch_multiplier(),
            jump_impulse: Self::default_jump_impulse(),
            gravity: Self::default_gravity(),
            max_fall_speed: Self::default_max_fall_speed(),
            eye_height: Self::default_eye_height(),
            crouch_eye_height: Self::default_crouch_eye_height(),
            step_height: Self::default_step_height(),
            probe_length: Self::default_probe_length(),
            interact_distance: Self::default_interact_distance(),
        }
    }
}

/// Guidance indicator tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidanceSettings {
    #[serde(default = "GuidanceSettings::default_smoothing_factor")]
    pub smoothing_factor: f32, // Per-frame exponential smoothing factor for the arrow bearing
    #[serde(default = "GuidanceSettings::default_near_distance")]
    pub near_distance: f32, // Distances below this count as the near tier
    #[serde(default = "GuidanceSettings::default_mid_distance")]
    pub mid_distance: f32, // Distances below this (and >= near) count as the mid tier
}

impl GuidanceSettings {
    fn default_smoothing_factor() -> f32 { 0.08 }
    fn default_near_distance() -> f32 { 3.0 }
    fn default_mid_distance() -> f32 { 8.0 }
}

impl Default for GuidanceSettings {
    fn default() -> Self {
        Self {
            smoothing_factor: Self::default_smoothing_factor(),
            near_distance: Self::default_near_distance(),
            mid_distance: Self::default_mid_distance(),
        }
    }
}

/// Model / scene selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSettings {
    #[serde(default = "SceneSettings::default_model_path")]
    pub model_path: String, // Asset-relative path of the campus glTF binary
    #[serde(default = "SceneSettings::default_model_name")]
    pub model_name: String, // Display name used by the loading banner
    #[serde(default = "SceneSettings::default_spawn_fallback")]
    pub spawn_fallback: [f32; 3], // Eye position used until the model provides a footprint
}

impl SceneSettings {
    fn default_model_path() -> String { "models/campus.glb".to_string() }
    fn default_model_name() -> String { "University of Larkano".to_string() }
    fn default_spawn_fallback() -> [f32; 3] { [0.0, 1.6, 10.0] }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            model_path: Self::default_model_path(),
            model_name: Self::default_model_name(),
            spawn_fallback: Self::default_spawn_fallback(),
        }
    }
}

/// Atmosphere settings to configure the bevy_atmosphere crate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmosphereSettings {
    #[serde(default = "AtmosphereSettings::default_enabled")]
    pub enabled: bool, // Enable the atmosphere (sky) renderer (required a restart of runtime)
    #[serde(default = "AtmosphereSettings::default_resolution")]
    pub resolution: u32, // Resolution of each skybox face (Auto update at runtime)
    #[serde(default = "AtmosphereSettings::default_dithering")]
    pub dithering: bool, // Enable dithering to reduce color banding in the sky (Auto update at runtime)
}

impl AtmosphereSettings {
    fn default_enabled() -> bool { true }
    fn default_resolution() -> u32 { 512 }
    fn default_dithering() -> bool { true }
}

impl Default for AtmosphereSettings {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            resolution: Self::default_resolution(),
            dithering: Self::default_dithering(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub graphics: GraphicsSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
    #[serde(default)]
    pub movement: MovementSettings,
    #[serde(default)]
    pub guidance: GuidanceSettings,
    #[serde(default)]
    pub scene: SceneSettings,
    #[serde(default)]
    pub atmosphere: AtmosphereSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            graphics: GraphicsSettings::default(),
            controls: ControlsSettings::default(),
            movement: MovementSettings::default(),
            guidance: GuidanceSettings::default(),
            scene: SceneSettings::default(),
            atmosphere: AtmosphereSettings::default(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn defaults() -> Self { Settings::default() }

    /// Convert a string key identifier (e.g., from `controls.keybinds`) into a `KeyCode` that
    /// can be used with Bevy's input system.
    ///
    /// # Arguments
    /// * `name` - The string key identifier to convert (e.g., "W", "Space", "F1").
    ///
    /// # Returns
    /// An `Option<KeyCode>` corresponding to the provided string, or `None` if the string
    /// does not match any known key.
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        let s = name.to_ascii_uppercase();
        if s.len() == 1 {
            let c = s.chars().next()?;
            if ('A'..='Z').contains(&c) {
                return Some(match c {
                    'A' => KeyCode::KeyA,
                    'B' => KeyCode::KeyB,
                    'C' => KeyCode::KeyC,
                    'D' => KeyCode::KeyD,
                    'E' => KeyCode::KeyE,
                    'F' => KeyCode::KeyF,
                    'G' => KeyCode::KeyG,
                    'H' => KeyCode::KeyH,
                    'I' => KeyCode::KeyI,
                    'J' => KeyCode::KeyJ,
                    'K' => KeyCode::KeyK,
                    'L' => KeyCode::KeyL,
                    'M' => KeyCode::KeyM,
                    'N' => KeyCode::KeyN,
                    'O' => KeyCode::KeyO,
                    'P' => KeyCode::KeyP,
                    'Q' => KeyCode::KeyQ,
                    'R' => KeyCode::KeyR,
                    'S' => KeyCode::KeyS,
                    'T' => KeyCode::KeyT,
                    'U' => KeyCode::KeyU,
                    'V' => KeyCode::KeyV,
                    'W' => KeyCode::KeyW,
                    'X' => KeyCode::KeyX,
                    'Y' => KeyCode::KeyY,
                    'Z' => KeyCode::KeyZ,
                    _ => return None,
                });
            }
            if c.is_ascii_digit() {
                return Some(match c {
                    '0' => KeyCode::Digit0,
                    '1' => KeyCode::Digit1,
                    '2' => KeyCode::Digit2,
                    '3' => KeyCode::Digit3,
                    '4' => KeyCode::Digit4,
                    '5' => KeyCode::Digit5,
                    '6' => KeyCode::Digit6,
                    '7' => KeyCode::Digit7,
                    '8' => KeyCode::Digit8,
                    '9' => KeyCode::Digit9,
                    _ => return None,
                });
            }
        }

        Some(match s.as_str() {
            // Function keys
            "F1" => KeyCode::F1,
            "F2" => KeyCode::F2,
            "F3" => KeyCode::F3,
            "F4" => KeyCode::F4,
            "F5" => KeyCode::F5,
            "F6" => KeyCode::F6,
            "F7" => KeyCode::F7,
            "F8" => KeyCode::F8,
            "F9" => KeyCode::F9,
            "F10" => KeyCode::F10,
            "F11" => KeyCode::F11,
            "F12" => KeyCode::F12,

            // Arrows / navigation
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
            "HOME" => KeyCode::Home,
            "END" => KeyCode::End,
            "PAGEUP" => KeyCode::PageUp,
            "PAGEDOWN" => KeyCode::PageDown,
            "INSERT" => KeyCode::Insert,
            "DELETE" | "DEL" => KeyCode::Delete,

            // Whitespace / control
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "BACKSPACE" | "BACK" => KeyCode::Backspace,

            // Modifiers
            "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
            "RSHIFT" => KeyCode::ShiftRight,
            "LCTRL" | "CTRL" | "CONTROL" => KeyCode::ControlLeft,
            "RCTRL" => KeyCode::ControlRight,
            "LALT" | "ALT" => KeyCode::AltLeft,
            "RALT" => KeyCode::AltRight,

            // Punctuation / symbols
            "-" | "MINUS" => KeyCode::Minus,
            "=" | "EQUALS" | "PLUS" => KeyCode::Equal,
            "[" | "LBRACKET" | "LEFTBRACKET" => KeyCode::BracketLeft,
            "]" | "RBRACKET" | "RIGHTBRACKET" => KeyCode::BracketRight,
            "\\" | "BACKSLASH" => KeyCode::Backslash,
            ";" | "SEMICOLON" => KeyCode::Semicolon,
            "'" | "APOSTROPHE" | "QUOTE" => KeyCode::Quote,
            "`" | "BACKQUOTE" | "GRAVE" => KeyCode::Backquote,
            "," | "COMMA" => KeyCode::Comma,
            "." | "DOT" | "PERIOD" => KeyCode::Period,
            "/" | "SLASH" => KeyCode::Slash,

            // Special
            "CAPSLOCK" => KeyCode::CapsLock,
            "SCROLLLOCK" => KeyCode::ScrollLock,
            "PAUSE" | "BREAK" => KeyCode::Pause,
            "PRINTSCREEN" | "PRTSCR" => KeyCode::PrintScreen,
            "NUMLOCK" => KeyCode::NumLock,

            _ => return None,
        })
    }
}

pub mod loader;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keycode_parsing_accepts_common_names() {
        assert_eq!(Settings::keycode_from_str("w"), Some(KeyCode::KeyW));
        assert_eq!(Settings::keycode_from_str("Space"), Some(KeyCode::Space));
        assert_eq!(Settings::keycode_from_str("LSHIFT"), Some(KeyCode::ShiftLeft));
        assert_eq!(Settings::keycode_from_str("ArrowUp"), Some(KeyCode::ArrowUp));
        assert_eq!(Settings::keycode_from_str("7"), Some(KeyCode::Digit7));
        assert_eq!(Settings::keycode_from_str("notakey"), None);
    }

    #[test]
    fn default_keybinds_cover_every_walkthrough_action() {
        let controls = ControlsSettings::default();
        for action in [
            "forward", "back", "left", "right", "jump", "sprint", "crouch",
            "interact", "destinations", "clear_target", "retry_load",
        ] {
            assert!(
                controls.keybinds.contains_key(action),
                "missing default bind for {action}"
            );
        }
        assert_eq!(controls.key("interact", KeyCode::KeyE), KeyCode::KeyE);
        assert_eq!(controls.key("unbound_action", KeyCode::KeyQ), KeyCode::KeyQ);
    }

    #[test]
    fn settings_parse_from_partial_ron() {
        let parsed: Settings = ron::from_str(
            "(movement: (walk_speed: 4.0), guidance: (smoothing_factor: 0.1))",
        )
        .expect("partial settings should parse");
        assert!((parsed.movement.walk_speed - 4.0).abs() < f32::EPSILON);
        assert!((parsed.movement.jump_impulse - 5.5).abs() < f32::EPSILON);
        assert!((parsed.guidance.smoothing_factor - 0.1).abs() < f32::EPSILON);
        assert!((parsed.guidance.near_distance - 3.0).abs() < f32::EPSILON);
    }
}
