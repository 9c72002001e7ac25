pub mod duration;
pub mod logging;

pub use duration::HumanDuration;
pub use logging::init_logging;
