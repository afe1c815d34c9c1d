use std::fmt::Display;
use std::str::FromStr as _;

use serde_json::Value;
use sqlx::{Row as _, query};
use tilejson::{Bounds, Center, TileJSON, tilejson};
use tracing::{info, warn};

use crate::tiles::mbtiles::{MbtilesError, MbtilesStore};

impl MbtilesStore {
    fn to_val<V, E: Display>(&self, val: Result<V, E>, name: &str) -> Option<V> {
        match val {
            Ok(v) => Some(v),
            Err(err) => {
                let file = self.path().display();
                warn!("Unable to parse metadata {name} value in {file}: {err}");
                None
            }
        }
    }

    /// Reads the `metadata` table into a [`TileJSON`].
    ///
    /// Unknown keys are kept in [`TileJSON::other`]. The `vector_layers` entry of the
    /// `json` key becomes [`TileJSON::vector_layers`], and its remaining keys are
    /// merged into `other`.
    pub async fn read_tilejson(&self) -> Result<TileJSON, MbtilesError> {
        let rows = query("SELECT name, value FROM metadata WHERE value IS NOT ''")
            .fetch_all(self.pool())
            .await
            .map_err(|e| MbtilesError::QueryError(e, self.path().to_path_buf()))?;

        let mut tj = tilejson! { tiles: vec![] };
        let mut json: Option<Value> = None;

        for row in rows {
            let (Ok(Some(name)), Ok(Some(value))) = (
                row.try_get::<Option<String>, _>(0),
                row.try_get::<Option<String>, _>(1),
            ) else {
                continue;
            };
            match name.as_ref() {
                "name" => tj.name = Some(value),
                "version" => tj.version = Some(value),
                "bounds" => tj.bounds = self.to_val(Bounds::from_str(value.as_str()), &name),
                "center" => tj.center = self.to_val(Center::from_str(value.as_str()), &name),
                "minzoom" => tj.minzoom = self.to_val(value.parse(), &name),
                "maxzoom" => tj.maxzoom = self.to_val(value.parse(), &name),
                "description" => tj.description = Some(value),
                "attribution" => tj.attribution = Some(value),
                "legend" => tj.legend = Some(value),
                "template" => tj.template = Some(value),
                "json" => json = self.to_val(serde_json::from_str(&value), &name),
                "format" | "scheme" | "type" | "generator" => {
                    tj.other.insert(name, Value::String(value));
                }
                _ => {
                    let file = self.path().display();
                    info!("{file} has an unrecognized metadata value {name}={value}");
                    tj.other.insert(name, Value::String(value));
                }
            }
        }

        if let Some(Value::Object(mut obj)) = json {
            if let Some(value) = obj.remove("vector_layers") {
                if let Ok(v) = serde_json::from_value(value) {
                    tj.vector_layers = Some(v);
                } else {
                    let file = self.path().display();
                    warn!("Unable to parse metadata vector_layers value in {file}");
                }
            }
            tj.other.extend(obj);
        }

        Ok(tj)
    }
}
