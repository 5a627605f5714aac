use axum::middleware;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::extractors::site::bind_api_site;
use crate::handlers::{content, generate, image, param, section, site};
use crate::state::AppState;

pub fn routes(state: AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest(
        "/ssg",
        OpenApiRouter::new()
            .nest("/sites", site_routes())
            .merge(site_scoped_routes(state)),
    )
}

fn site_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(site::create_site, site::list_sites))
        .routes(routes!(site::get_site, site::delete_site))
}

/// Routes that act on the site named by the `X-Site-Slug` header.
fn site_scoped_routes(state: AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(generate::generate_markdown))
        .routes(routes!(generate::generate_html))
        .routes(routes!(generate::publish))
        .routes(routes!(generate::plan))
        .routes(routes!(content::search_contents, content::create_content))
        .routes(routes!(content::get_content, content::update_content, content::delete_content))
        .routes(routes!(content::list_content_tags, content::add_content_tag))
        .routes(routes!(content::remove_content_tag))
        .routes(routes!(content::list_tags))
        .routes(routes!(content::delete_tag))
        .routes(routes!(section::list_sections, section::create_section))
        .routes(routes!(section::get_section, section::update_section, section::delete_section))
        .routes(routes!(section::list_layouts, section::create_layout))
        .routes(routes!(section::get_layout, section::update_layout, section::delete_layout))
        .routes(routes!(param::list_params, param::create_param))
        .routes(routes!(param::get_param, param::update_param, param::delete_param))
        .merge(image_routes())
        .route_layer(middleware::from_fn_with_state(state, bind_api_site))
}

fn image_routes() -> OpenApiRouter<AppState> {
    let uploads = OpenApiRouter::new()
        .routes(routes!(image::upload_content_image, image::list_content_images))
        .routes(routes!(image::upload_section_image, image::list_section_images))
        .layer(image::image_upload_body_limit());

    OpenApiRouter::new()
        .merge(uploads)
        .routes(routes!(image::delete_content_image))
        .routes(routes!(image::delete_section_image))
        .routes(routes!(image::list_variants, image::create_variant))
        .routes(routes!(image::delete_variant))
}
