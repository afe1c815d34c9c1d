use actix_web::error::ErrorNotFound;
use actix_web::web::{Data, Path};
use actix_web::{HttpResponse, Result as ActixResult, route};
use serde::Deserialize;
use tessera_core::tiles::{TileError, TileReply, TileRepository, TileRequest};

use crate::srv::server::map_internal_error;

/// Path of a tile request. Coordinates are only known to be digits, they may still overflow.
#[derive(Deserialize, Debug, Clone)]
pub struct TilePath {
    pub source_id: String,
    pub z: String,
    pub x: String,
    pub y: String,
    pub format: String,
}

impl TilePath {
    fn to_request(&self) -> Option<TileRequest> {
        Some(TileRequest {
            source_id: self.source_id.clone(),
            z: self.z.parse().ok()?,
            x: self.x.parse().ok()?,
            y: self.y.parse().ok()?,
            format: self.format.clone(),
        })
    }
}

/// Expected outcomes become a plain-text 404, anything else is an internal error.
fn map_tile_error(e: TileError) -> actix_web::Error {
    match e {
        TileError::UnknownSource(_) => ErrorNotFound("Not Found"),
        e if e.is_expected() => ErrorNotFound(e.to_string()),
        e => map_internal_error(e),
    }
}

#[route(
    "/data/{source_id}/{z:\\d+}/{x:\\d+}/{y:\\d+}.{format:[\\w.]+}",
    method = "GET",
    method = "HEAD"
)]
async fn get_tile(path: Path<TilePath>, repo: Data<TileRepository>) -> ActixResult<HttpResponse> {
    let Some(req) = path.to_request() else {
        // digits that do not fit into u64 are certainly outside of the 2^z grid
        return Err(ErrorNotFound("Out of bounds"));
    };

    let tile = match repo.serve_tile(&req).await.map_err(map_tile_error)? {
        TileReply::Tile(tile) | TileReply::Placeholder(tile) => tile,
        TileReply::NoContent => return Ok(HttpResponse::NoContent().finish()),
    };

    let mut response = HttpResponse::Ok();
    for (name, value) in &tile.headers {
        response.insert_header((name.as_str(), value.as_str()));
    }
    Ok(response.body(tile.data))
}
