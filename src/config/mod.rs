// Configuration module
// Public interface for configuration loading

mod colors;
pub mod constants;
mod loader;
mod settings;

pub use colors::{ColorScheme, ColorSpec};
pub use loader::{config_dir, default_config_path, history_path, load_config};
pub use settings::Config;
