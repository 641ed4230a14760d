pub mod attempt;
pub mod ranking;
pub mod session;
pub mod task;
pub mod user;
