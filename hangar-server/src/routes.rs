//! HTTP handlers for Hangar server.

use actix_web::error::{BlockingError, InternalError};
use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, post, web};
use hangar_core::{HangarError, Ship, ShipInput, ShipQuery, ShipService};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::openapi::ApiDoc;
use crate::store::ShipBackend;

#[derive(Clone)]
/// Shared application state for handlers.
pub struct AppState {
    /// Ship storage backend.
    pub backend: ShipBackend,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
}

fn error_response(err: &HangarError) -> HttpResponse {
    let body = ErrorResponse {
        message: err.to_string(),
    };
    match err {
        HangarError::Validation(_) => HttpResponse::BadRequest().json(body),
        HangarError::NotFound(_) => HttpResponse::NotFound().json(body),
        HangarError::Store(_) => HttpResponse::InternalServerError().json(body),
    }
}

fn respond<T: Serialize>(result: Result<hangar_core::Result<T>, BlockingError>) -> HttpResponse {
    match result {
        Ok(Ok(value)) => HttpResponse::Ok().json(value),
        Ok(Err(err)) => error_response(&err),
        Err(err) => HttpResponse::InternalServerError().json(ErrorResponse {
            message: format!("ship task failed: {err}"),
        }),
    }
}

/// Parse a path id, rejecting anything but a positive integer.
fn parse_id(raw: &str) -> Result<i64, HttpResponse> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(error_response(&HangarError::invalid_field("id"))),
    }
}

#[utoipa::path(
    get,
    path = "/rest/ships",
    params(ShipQuery),
    responses(
        (status = 200, description = "One page of matching ships", body = [Ship]),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships")]
/// List ships matching the filters, sorted and paginated.
pub async fn ships_list(state: web::Data<AppState>, query: web::Query<ShipQuery>) -> impl Responder {
    let filter = match query.filter() {
        Ok(filter) => filter,
        Err(err) => return error_response(&err),
    };
    let page = match query.page() {
        Ok(page) => page,
        Err(err) => return error_response(&err),
    };
    let order = query.order();
    let backend = state.backend.clone();
    let result = web::block(move || {
        backend.run(|store| ShipService::new(store).list(&filter, order, page))
    })
    .await;
    respond(result)
}

#[utoipa::path(
    get,
    path = "/rest/ships/count",
    params(ShipQuery),
    responses(
        (status = 200, description = "Number of matching ships", body = i64),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships/count")]
/// Count ships matching the filters. Sorting and paging parameters are ignored.
pub async fn ships_count(
    state: web::Data<AppState>,
    query: web::Query<ShipQuery>,
) -> impl Responder {
    let filter = match query.filter() {
        Ok(filter) => filter,
        Err(err) => return error_response(&err),
    };
    let backend = state.backend.clone();
    let result = web::block(move || backend.run(|store| ShipService::new(store).count(&filter))).await;
    respond(result)
}

#[utoipa::path(
    post,
    path = "/rest/ships",
    request_body = ShipInput,
    responses(
        (status = 200, description = "Created ship", body = Ship),
        (status = 400, description = "Invalid ship", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[post("/rest/ships")]
/// Create a ship. The rating is computed server-side.
pub async fn ship_create(
    state: web::Data<AppState>,
    payload: web::Json<ShipInput>,
) -> impl Responder {
    let input = payload.into_inner();
    let backend = state.backend.clone();
    let result = web::block(move || backend.run(|store| ShipService::new(store).add(input))).await;
    respond(result)
}

#[utoipa::path(
    get,
    path = "/rest/ships/{id}",
    params(
        ("id" = i64, Path, description = "Ship identifier")
    ),
    responses(
        (status = 200, description = "Ship", body = Ship),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Ship not found", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships/{id}")]
/// Fetch a ship by id.
pub async fn ship_get(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let backend = state.backend.clone();
    let result = web::block(move || {
        backend.run(|store| {
            ShipService::new(store)
                .get_by_id(id)?
                .ok_or(HangarError::NotFound(id))
        })
    })
    .await;
    respond(result)
}

#[utoipa::path(
    post,
    path = "/rest/ships/{id}",
    params(
        ("id" = i64, Path, description = "Ship identifier")
    ),
    request_body = ShipInput,
    responses(
        (status = 200, description = "Updated ship", body = Ship),
        (status = 400, description = "Invalid id or field", body = ErrorResponse),
        (status = 404, description = "Ship not found", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[post("/rest/ships/{id}")]
/// Update the fields present in the body; the rating is recomputed.
pub async fn ship_update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ShipInput>,
) -> impl Responder {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let input = payload.into_inner();
    let backend = state.backend.clone();
    let result =
        web::block(move || backend.run(|store| ShipService::new(store).update(id, input))).await;
    respond(result)
}

#[utoipa::path(
    delete,
    path = "/rest/ships/{id}",
    params(
        ("id" = i64, Path, description = "Ship identifier")
    ),
    responses(
        (status = 200, description = "Ship deleted"),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Ship not found", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[delete("/rest/ships/{id}")]
/// Delete a ship.
pub async fn ship_delete(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let backend = state.backend.clone();
    let result = web::block(move || backend.run(|store| ShipService::new(store).delete(id))).await;
    match result {
        Ok(Ok(())) => HttpResponse::Ok().finish(),
        other => respond(other),
    }
}

#[utoipa::path(
    get,
    path = "/rest/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/rest/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

fn bad_request(err: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        message: err.to_string(),
    })
}

/// Register handlers and extractor error handling.
///
/// `ships_count` is registered before `ship_get` so `/count` is not taken for an id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        let response = bad_request(&err);
        InternalError::from_response(err, response).into()
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        let response = bad_request(&err);
        InternalError::from_response(err, response).into()
    }))
    .service(ships_count)
    .service(ships_list)
    .service(ship_create)
    .service(ship_get)
    .service(ship_update)
    .service(ship_delete)
    .service(openapi_json);
}
