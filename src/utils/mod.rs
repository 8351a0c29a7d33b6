pub mod config;
pub mod env;
pub mod fd_limit;
pub mod logger;
pub mod settings_toml;

pub use config::*;
pub use env::{env_override, inkscape_override, packager_override};
pub use fd_limit::{FDS_PER_PIPELINE, cap_concurrency, max_open_fds, max_pipelines_by_fd_limit};
pub use logger::{Colors, setup_logging};
pub use settings_toml::{SettingsToml, apply_file_to_opts, load_settings_toml, parse_settings_toml};
