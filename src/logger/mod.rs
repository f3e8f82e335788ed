//! Reloadable tracing setup; verified manually via `bin/logger_demo.rs`.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
