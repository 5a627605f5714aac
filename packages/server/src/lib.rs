pub mod cancel;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod generator;
pub mod handlers;
pub mod images;
pub mod models;
pub mod orchestrator;
pub mod params;
pub mod preview;
pub mod publish;
pub mod repo;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;
pub mod workspace;

use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folio API",
        version = "1.0.0",
        description = "Multi-site static site generator: sites, content, images, generation and publishing"
    ),
    tags(
        (name = "Sites", description = "Site lifecycle"),
        (name = "Generation", description = "Markdown and HTML generation"),
        (name = "Publishing", description = "Publishing generated HTML to a git branch"),
        (name = "Contents", description = "Content CRUD, search and tagging"),
        (name = "Sections", description = "Sections and their layouts"),
        (name = "Params", description = "Per-site runtime parameters"),
        (name = "Images", description = "Image uploads and variants"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes(state.clone()))
        .split_for_parts();

    router
        .merge(routes::web_routes(state.clone()))
        .with_state(state)
        .merge(Scalar::with_url("/scalar", api))
        .layer(TraceLayer::new_for_http())
}
