pub mod setup;
pub mod player;
pub mod atmosphere;
pub mod display;

pub use setup::setup;
pub use player::update_player_fill_light;
pub use atmosphere::sync_atmosphere_settings;
pub use display::sync_vsync_settings;
