pub mod constants;
pub mod filename;
pub mod format;
pub mod progress;

pub use constants::*;
pub use filename::{discover_files, display_name, FilenameDateRule};
pub use format::{format_value, parse_value, round_to};
pub use progress::ProgressReporter;
