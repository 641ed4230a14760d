pub mod common;
pub mod session;
pub mod task;
pub mod user;
