mod v1;

use axum::{Router, middleware, routing::get};
use utoipa_axum::router::OpenApiRouter;

use crate::extractors::site::bind_web_site;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(state: AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes(state))
}

/// Editing screens. `/ssg/sites` stays reachable without a bound site.
pub fn web_routes(state: AppState) -> Router<AppState> {
    let bound = Router::new()
        .route("/current", get(handlers::web::current_page))
        .route_layer(middleware::from_fn_with_state(state, bind_web_site));

    Router::new().nest(
        "/ssg",
        Router::new()
            .route("/sites", get(handlers::web::sites_page))
            .merge(bound),
    )
}
