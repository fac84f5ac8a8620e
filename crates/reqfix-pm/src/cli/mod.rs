//! Terminal output helpers shared by the `reqfix` binary.

mod output;
mod progress;

pub use output::{Output, Verbosity};
pub use progress::ProgressManager;
