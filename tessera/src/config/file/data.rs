use serde::{Deserialize, Serialize};
use tessera_core::tiles::{FormatAliases, SourceParams, SourcePaths};

use crate::config::file::{UnrecognizedKeys, UnrecognizedValues, copy_unrecognized_keys_from_config};

/// Settings shared by all sources, the `options` section of the config file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directories of relative `pmtiles` and `mbtiles` locators
    #[serde(default, skip_serializing_if = "is_default_paths")]
    pub paths: SourcePaths,
    /// Canonical format -> accepted request extension, e.g. `pbf: vector.pbf`
    #[serde(default, skip_serializing_if = "FormatAliases::is_empty")]
    pub format_aliases: FormatAliases,
    /// Domains used in the `tiles` URLs of every source.
    /// `*` stands for the first label of the request host.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,

    #[serde(flatten, skip_serializing)]
    pub unrecognized: UnrecognizedValues,
}

fn is_default_paths(paths: &SourcePaths) -> bool {
    paths == &SourcePaths::default()
}

impl OptionsConfig {
    #[must_use]
    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }

    pub fn get_unrecognized_keys(&self) -> UnrecognizedKeys {
        let mut keys = UnrecognizedKeys::new();
        copy_unrecognized_keys_from_config(&mut keys, "", &self.unrecognized);
        keys
    }
}

/// A single entry of the `data` section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(flatten)]
    pub params: SourceParams,

    #[serde(flatten, skip_serializing)]
    pub unrecognized: UnrecognizedValues,
}

impl SourceConfig {
    #[must_use]
    pub fn pmtiles(locator: impl Into<String>) -> Self {
        Self {
            params: SourceParams {
                pmtiles: Some(locator.into()),
                ..SourceParams::default()
            },
            unrecognized: UnrecognizedValues::new(),
        }
    }

    #[must_use]
    pub fn mbtiles(locator: impl Into<String>) -> Self {
        Self {
            params: SourceParams {
                mbtiles: Some(locator.into()),
                ..SourceParams::default()
            },
            unrecognized: UnrecognizedValues::new(),
        }
    }

    pub fn get_unrecognized_keys(&self) -> UnrecognizedKeys {
        let mut keys = UnrecognizedKeys::new();
        copy_unrecognized_keys_from_config(&mut keys, "", &self.unrecognized);
        keys
    }
}
