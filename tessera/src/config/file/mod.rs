mod data;
pub use data::*;

mod main;
pub use main::*;

pub mod srv;

mod error;
pub use error::{ConfigFileError, ConfigFileResult};

use std::collections::{HashMap, HashSet};

pub type UnrecognizedValues = HashMap<String, serde_yaml::Value>;
pub type UnrecognizedKeys = HashSet<String>;

pub fn copy_unrecognized_keys_from_config(
    result: &mut UnrecognizedKeys,
    prefix: &str,
    unrecognized: &UnrecognizedValues,
) {
    result.extend(unrecognized.keys().map(|k| format!("{prefix}{k}")));
}
