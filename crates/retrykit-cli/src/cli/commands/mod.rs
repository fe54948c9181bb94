//! CLI command handlers, one per file.

mod classify;
mod probe;
mod schedule;

pub use classify::{run_classify, ClassifyArgs};
pub use probe::run_probe;
pub use schedule::run_schedule;
