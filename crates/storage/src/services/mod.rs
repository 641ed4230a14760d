pub mod lifecycle;
pub mod passwords;
pub mod ranking;
