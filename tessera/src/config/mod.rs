pub mod args;
pub mod env;
pub mod file;

pub use file::{Config, read_config};
