//! Output formatting for CLI.

mod json;
mod progress;

pub use json::{to_json, JsonOutput};
pub use progress::ProgressBar;
