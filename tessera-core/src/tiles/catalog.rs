//! Listing of the registered tile sources.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tiles::StoreKind;

/// A catalog mapping source IDs to their metadata entries, sorted by ID.
///
/// # Examples
///
/// ```rust
/// use tessera_core::tiles::StoreKind;
/// use tessera_core::tiles::catalog::{CatalogSourceEntry, TileCatalog};
///
/// let mut catalog = TileCatalog::new();
/// catalog.insert(
///     "sample".to_string(),
///     CatalogSourceEntry {
///         source_type: StoreKind::Pmtiles,
///         format: "pbf".to_string(),
///         content_type: "application/x-protobuf".to_string(),
///         name: Some("Sample".to_string()),
///         description: None,
///         attribution: None,
///     },
/// );
/// ```
pub type TileCatalog = BTreeMap<String, CatalogSourceEntry>;

/// Metadata of a single source in the catalog.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogSourceEntry {
    /// Backend that stores the tiles
    #[serde(rename = "type")]
    pub source_type: StoreKind,
    /// Native tile format, e.g. `pbf` or `png`
    pub format: String,
    /// MIME type of served tiles
    pub content_type: String,
    /// Human-readable name
    pub name: Option<String>,
    /// Description of the source content
    pub description: Option<String>,
    /// Attribution text for the data source
    pub attribution: Option<String>,
}
