//! Environment variables used for `${VAR}` substitution in configuration files.
//!
//! - [`OsEnv`]: the process environment
//! - [`FauxEnv`]: a fixed map, for tests

use std::collections::HashMap;
use std::ffi::OsString;

use subst::VariableMap;

/// The process environment.
#[derive(Debug, Default)]
pub struct OsEnv;

impl<'a> VariableMap<'a> for OsEnv {
    type Value = String;

    fn get(&'a self, key: &str) -> Option<Self::Value> {
        std::env::var(key).ok()
    }
}

/// A fixed set of variables.
#[derive(Debug, Default)]
pub struct FauxEnv(pub HashMap<&'static str, OsString>);

impl<'a> VariableMap<'a> for FauxEnv {
    type Value = String;

    fn get(&'a self, key: &str) -> Option<Self::Value> {
        self.0.get(key).map(|s| s.to_string_lossy().to_string())
    }
}
