mod account_service;
mod board_service;
mod session_service;
mod task_service;

pub use account_service::*;
pub use board_service::*;
pub use session_service::*;
pub use task_service::*;
