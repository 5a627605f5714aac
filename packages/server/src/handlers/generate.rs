use axum::Json;
use axum::extract::State;
use tracing::{info, instrument};

use crate::cancel::request_token;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::OptionalJson;
use crate::extractors::site::CurrentSite;
use crate::generator::{self, SiteBuild};
use crate::models::generate::*;
use crate::publish::PublishOptions;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/generate-markdown",
    tag = "Generation",
    operation_id = "generateMarkdown",
    summary = "Write Markdown documents for every content item",
    description = "Writes one frontmatter document per item under the site's markdown root. \
        Items that fail are listed in the report and skipped.",
    params(("X-Site-Slug" = String, Header, description = "Site slug")),
    responses(
        (status = 200, description = "Generation report", body = ReportEnvelope),
        (status = 400, description = "Missing site header (BAD_REQUEST)", body = ErrorBody),
        (status = 404, description = "Site not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, site), fields(site = %site.slug()))]
pub async fn generate_markdown(
    State(state): State<AppState>,
    CurrentSite(site): CurrentSite,
) -> Result<Json<ReportEnvelope>, AppError> {
    let (cancel, _guard) = request_token();
    let build = SiteBuild::load(&state.workspace, &state.config.ssg, &site.site, &site.repo).await?;
    let report = generator::markdown::generate(&build, &cancel).await?;
    info!(pages = report.pages, failures = report.failures.len(), "Markdown generated");
    Ok(Json(ReportEnvelope { report }))
}

#[utoipa::path(
    post,
    path = "/generate-html",
    tag = "Generation",
    operation_id = "generateHtml",
    summary = "Render the site to HTML",
    description = "Renders every non-draft item, the section and blog indexes, and copies \
        static assets and uploaded images into the site's HTML root.",
    params(("X-Site-Slug" = String, Header, description = "Site slug")),
    responses(
        (status = 200, description = "Generation report", body = ReportEnvelope),
        (status = 400, description = "Missing site header (BAD_REQUEST)", body = ErrorBody),
        (status = 404, description = "Site not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, site), fields(site = %site.slug()))]
pub async fn generate_html(
    State(state): State<AppState>,
    CurrentSite(site): CurrentSite,
) -> Result<Json<ReportEnvelope>, AppError> {
    let (cancel, _guard) = request_token();
    let build = SiteBuild::load(&state.workspace, &state.config.ssg, &site.site, &site.repo).await?;
    let report = generator::html::generate(&build, &cancel).await?;
    info!(
        pages = report.pages,
        index_pages = report.index_pages,
        failures = report.failures.len(),
        "HTML generated"
    );
    Ok(Json(ReportEnvelope { report }))
}

#[utoipa::path(
    post,
    path = "/publish",
    tag = "Publishing",
    operation_id = "publishSite",
    summary = "Publish the generated HTML to the configured git branch",
    description = "Clones the publish repository into a scratch directory, mirrors the HTML \
        root into the pages subdirectory, commits and pushes. The body is optional.",
    params(("X-Site-Slug" = String, Header, description = "Site slug")),
    request_body(content = PublishRequest, description = "Optional publish options"),
    responses(
        (status = 200, description = "Commit pushed", body = PublishEnvelope),
        (status = 400, description = "Invalid publish settings (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "A git step failed (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, site, request), fields(site = %site.slug()))]
pub async fn publish(
    State(state): State<AppState>,
    CurrentSite(site): CurrentSite,
    OptionalJson(request): OptionalJson<PublishRequest>,
) -> Result<Json<PublishEnvelope>, AppError> {
    let (cancel, _guard) = request_token();
    let build = SiteBuild::load(&state.workspace, &state.config.ssg, &site.site, &site.repo).await?;
    let cfg = build.params.publish_config();

    let publish = state
        .publisher
        .publish(
            &cfg,
            &build.paths.html,
            PublishOptions {
                skip_if_unchanged: request.skip_if_unchanged,
            },
            &cancel,
        )
        .await?;
    Ok(Json(PublishEnvelope { publish }))
}

#[utoipa::path(
    post,
    path = "/plan",
    tag = "Publishing",
    operation_id = "planPublish",
    summary = "Dry-run a publish",
    description = "Stages the HTML root exactly as a publish would and reports added, modified \
        and removed paths. Nothing is committed or pushed.",
    params(("X-Site-Slug" = String, Header, description = "Site slug")),
    responses(
        (status = 200, description = "Planned changes", body = PlanEnvelope),
        (status = 400, description = "Invalid publish settings (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "A git step failed (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, site), fields(site = %site.slug()))]
pub async fn plan(
    State(state): State<AppState>,
    CurrentSite(site): CurrentSite,
) -> Result<Json<PlanEnvelope>, AppError> {
    let (cancel, _guard) = request_token();
    let build = SiteBuild::load(&state.workspace, &state.config.ssg, &site.site, &site.repo).await?;
    let cfg = build.params.publish_config();
    let plan = state.publisher.plan(&cfg, &build.paths.html, &cancel).await?;
    Ok(Json(PlanEnvelope { plan }))
}
