use actix_web::error::ErrorNotFound;
use actix_web::web::{Data, Path, Query};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, route};
use serde::Deserialize;
use tessera_core::tiles::{TileRepository, TileUrlContext};

#[derive(Deserialize, Debug)]
pub struct SourceIdRequest {
    pub source_id: String,
}

/// Query parameters copied into every tile URL of the returned document.
#[derive(Deserialize, Debug, Default)]
pub struct InfoQuery {
    pub key: Option<String>,
    pub style: Option<String>,
}

#[route(
    "/data/{source_id}.json",
    method = "GET",
    method = "HEAD",
    wrap = "middleware::Compress::default()"
)]
#[allow(clippy::unused_async)]
async fn get_source_info(
    req: HttpRequest,
    path: Path<SourceIdRequest>,
    repo: Data<TileRepository>,
) -> ActixResult<HttpResponse> {
    let record = repo
        .get(&path.source_id)
        .ok_or_else(|| ErrorNotFound("Not Found"))?;

    // A malformed query string only means there is nothing to pass on
    let query = Query::<InfoQuery>::from_query(req.query_string())
        .map(Query::into_inner)
        .unwrap_or_default();
    let info = req.connection_info();
    let ctx = TileUrlContext {
        scheme: info.scheme().to_string(),
        host: info.host().to_string(),
        forwarded_path: req
            .headers()
            .get("x-forwarded-path")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        key: query.key,
        style: query.style,
    };

    let tilejson = record.tilejson_for_request(&ctx, &repo.options().format_aliases);
    Ok(HttpResponse::Ok().json(tilejson))
}
