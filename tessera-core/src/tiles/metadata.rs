use std::net::Ipv4Addr;

use serde_json::{Map, Value};
use tessera_tile_utils::MAX_ZOOM;
use tilejson::{Bounds, Center, TileJSON};
use tracing::warn;
use urlencoding::encode;

use crate::tiles::format::{FormatAliases, VECTOR_FORMAT};
use crate::tiles::{TileError, TileResult};

/// Backend keys that describe the file rather than the tiles.
const DROPPED_KEYS: [&str; 3] = ["filesize", "mtime", "scheme"];

/// Builds the `TileJSON` document of a source at registration time.
///
/// `domains` seeds the `tiles` list, `name` defaults to `id`, and `format` defaults
/// to `pbf`. Backend fields are merged on top, then the caller `overrides`.
/// An invalid `center` or `bounds` is dropped with a warning. When bounds are known
/// but there is no center, the center is derived with [`center_from_bounds`].
pub fn assemble_tilejson(
    id: &str,
    domains: &[String],
    backend: &TileJSON,
    overrides: Option<&Map<String, Value>>,
) -> TileResult<TileJSON> {
    let mut doc = Map::new();
    doc.insert("tiles".to_string(), Value::from(domains.to_vec()));
    doc.insert("name".to_string(), Value::from(id));
    doc.insert("format".to_string(), Value::from(VECTOR_FORMAT));

    let backend = serde_json::to_value(backend)
        .map_err(|e| TileError::InvalidTileJson(e, id.to_string()))?;
    if let Value::Object(backend) = backend {
        for (key, value) in backend {
            // Backends never know the public tile URLs
            if key == "tiles" && value.as_array().is_none_or(Vec::is_empty) {
                continue;
            }
            doc.insert(key, value);
        }
    }

    doc.insert("tilejson".to_string(), Value::from("2.0.0"));
    for key in DROPPED_KEYS {
        doc.remove(key);
    }

    if let Some(overrides) = overrides {
        doc.extend(overrides.clone());
    }

    drop_invalid::<Center>(&mut doc, "center", id);
    drop_invalid::<Bounds>(&mut doc, "bounds", id);

    let mut tilejson: TileJSON = serde_json::from_value(Value::Object(doc))
        .map_err(|e| TileError::InvalidTileJson(e, id.to_string()))?;
    if tilejson.center.is_none()
        && let Some(bounds) = tilejson.bounds
    {
        tilejson.center = Some(center_from_bounds(bounds));
    }
    Ok(tilejson)
}

fn drop_invalid<T: serde::de::DeserializeOwned>(doc: &mut Map<String, Value>, key: &str, id: &str) {
    let Some(value) = doc.get(key) else {
        return;
    };
    if value.is_null() {
        doc.remove(key);
    } else if let Err(e) = serde_json::from_value::<T>(value.clone()) {
        warn!("Ignoring invalid {key} {value} of source {id}: {e}");
        doc.remove(key);
    }
}

/// Center of `bounds` with a zoom level at which the bounds span about four tiles.
///
/// ```
/// use tessera_core::tiles::center_from_bounds;
/// use tilejson::Bounds;
///
/// let center = center_from_bounds(Bounds::new(-180.0, -85.0, 180.0, 85.0));
/// assert_eq!((center.longitude, center.latitude, center.zoom), (0.0, 0.0, 2));
/// ```
#[must_use]
pub fn center_from_bounds(bounds: Bounds) -> Center {
    let span = (bounds.right - bounds.left) / 360.0 / 4.0;
    let zoom = (-span.log2()).round();
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let zoom = if zoom.is_nan() {
        0
    } else {
        zoom.clamp(0.0, f64::from(MAX_ZOOM)) as u8
    };
    Center {
        longitude: f64::midpoint(bounds.left, bounds.right),
        latitude: f64::midpoint(bounds.bottom, bounds.top),
        zoom,
    }
}

/// Request details needed to build absolute tile URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileUrlContext {
    /// `http` or `https`
    pub scheme: String,
    /// Value of the `Host` header, possibly with a port
    pub host: String,
    /// Value of the `X-Forwarded-Path` header
    pub forwarded_path: Option<String>,
    /// `key` query parameter, passed on to every tile URL
    pub key: Option<String>,
    /// `style` query parameter, passed on to every tile URL
    pub style: Option<String>,
}

impl TileUrlContext {
    /// `*` subdomains can only be expanded for a named host with a parent domain.
    fn relative_subdomains_usable(&self) -> bool {
        let host = self
            .host
            .rsplit_once(':')
            .map_or(self.host.as_str(), |(host, _port)| host);
        self.host.contains('.') && host.parse::<Ipv4Addr>().is_err()
    }

    fn query(&self) -> String {
        let pairs: Vec<_> = [("key", &self.key), ("style", &self.style)]
            .into_iter()
            .filter_map(|(name, value)| Some(format!("{name}={}", encode(value.as_deref()?))))
            .collect();
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

/// Absolute tile URL templates of a source for one request.
///
/// Each of the `domains` yields one template. A domain containing `*` has it
/// replaced by the first label of the request host, followed by the rest of the host.
/// With no usable domains the request host is used. A `public_url` replaces all of
/// that with a single template.
#[must_use]
pub fn tile_urls(
    ctx: &TileUrlContext,
    domains: &[String],
    id: &str,
    format: &str,
    public_url: Option<&str>,
    aliases: &FormatAliases,
) -> Vec<String> {
    let ext = aliases.alias(format);
    let query = ctx.query();
    let path = format!("data/{id}/{{z}}/{{x}}/{{y}}.{ext}{query}");

    if let Some(public_url) = public_url {
        return vec![format!("{public_url}{path}")];
    }

    let mut hosts: Vec<String> = Vec::with_capacity(domains.len());
    for domain in domains {
        if domain.contains('*') {
            if ctx.relative_subdomains_usable()
                && let Some((first, rest)) = ctx.host.split_once('.')
            {
                hosts.push(format!("{}.{rest}", domain.replacen('*', first, 1)));
            }
        } else {
            hosts.push(domain.clone());
        }
    }
    if hosts.is_empty() {
        hosts.push(ctx.host.clone());
    }

    let forwarded = ctx
        .forwarded_path
        .as_ref()
        .map(|p| format!("/{p}"))
        .unwrap_or_default();
    hosts
        .into_iter()
        .map(|host| format!("{}://{host}{forwarded}/{path}", ctx.scheme))
        .collect()
}
