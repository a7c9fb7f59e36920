pub mod constants;
pub mod filename;
pub mod logging;
pub mod progress;
pub mod units;

pub use constants::*;
pub use filename::recent_output_path;
pub use logging::init_logging;
pub use progress::ProgressReporter;
pub use units::{normalize, round_to, wrap_degrees, Unit};
