//! OpenAPI specification for Hangar server.

use utoipa::OpenApi;

use hangar_core::{Ship, ShipInput, ShipOrder, ShipType};

use crate::routes::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::ships_list,
        crate::routes::ships_count,
        crate::routes::ship_create,
        crate::routes::ship_get,
        crate::routes::ship_update,
        crate::routes::ship_delete,
        crate::routes::openapi_json
    ),
    components(schemas(Ship, ShipInput, ShipType, ShipOrder, ErrorResponse)),
    tags(
        (name = "ships", description = "Ship registry"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI specification for the Hangar server.
pub struct ApiDoc;
