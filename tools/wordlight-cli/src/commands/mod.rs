pub mod captions;
pub mod check;
pub mod config;
pub mod process;
