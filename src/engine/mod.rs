//! Engine module: CLI, option resolution, input enumeration and progress.

pub mod arg_parser;
pub mod cli;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{handle_run, resolve_opts};
pub use tools::{has_extension, is_os_hidden_file, list_items, prepare_dirs, remove_failed_outputs};
