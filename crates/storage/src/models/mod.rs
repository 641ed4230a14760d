mod attempt;
mod session;
mod solve;
mod task;
mod user;

pub use attempt::Attempt;
pub use session::Session;
pub use solve::Solve;
pub use task::{Task, derive_task_id};
pub use user::{User, UserCredentials};
