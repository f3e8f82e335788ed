mod account_service_impl;
mod auth_fake;
mod board_service_impl;
mod session_service_impl;
mod task_service_impl;

pub use account_service_impl::*;
pub use auth_fake::*;
pub use board_service_impl::*;
pub use session_service_impl::*;
pub use task_service_impl::*;
