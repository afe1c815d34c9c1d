use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Extension of decoded vector tiles.
pub const GEOJSON_FORMAT: &str = "geojson";

/// Native `TileJSON` format of vector tile sources.
pub const VECTOR_FORMAT: &str = "pbf";

/// Alternative URL extensions for canonical formats, e.g. `pbf: vector.pbf`.
///
/// Requests use the reverse lookup (alias to canonical), while generated tile URLs
/// use the forward lookup (canonical to alias).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatAliases(BTreeMap<String, String>);

impl FormatAliases {
    /// True if no aliases are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The canonical format a requested extension stands for.
    #[must_use]
    pub fn canonical<'a>(&'a self, token: &'a str) -> &'a str {
        self.0
            .iter()
            .find_map(|(canonical, alias)| (alias == token).then_some(canonical.as_str()))
            .unwrap_or(token)
    }

    /// The extension to advertise for a canonical format.
    #[must_use]
    pub fn alias<'a>(&'a self, canonical: &'a str) -> &'a str {
        self.0.get(canonical).map_or(canonical, String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormatAliases {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// What a tile request returns, relative to the native format of its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// The stored bytes, in the format the source declares
    Native,
    /// A vector tile decoded into a `GeoJSON` `FeatureCollection`
    GeoJson,
}

impl OutputFormat {
    /// `Content-Type` of the response, or `None` when the backend value must be kept.
    #[must_use]
    pub fn content_type(self, native: &str) -> Option<&'static str> {
        match self {
            Self::GeoJson => Some("application/json"),
            Self::Native if native == VECTOR_FORMAT => Some("application/x-protobuf"),
            Self::Native => None,
        }
    }
}

/// Decides whether a requested extension can be served by a source of `native` format.
///
/// The extension is first mapped through `aliases`. It is accepted if it names the
/// native format, or if it is `geojson` and the source holds vector tiles.
#[must_use]
pub fn resolve_format(
    requested: &str,
    native: &str,
    aliases: &FormatAliases,
) -> Option<OutputFormat> {
    let token = aliases.canonical(requested);
    if token == native {
        Some(OutputFormat::Native)
    } else if token == GEOJSON_FORMAT && native == VECTOR_FORMAT {
        Some(OutputFormat::GeoJson)
    } else {
        None
    }
}
