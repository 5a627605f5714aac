//! Request-scoped site binding.
//!
//! The API flow reads the slug from the `X-Site-Slug` header; the web flow
//! tries the `site` query parameter, then the `last_site` cookie, and falls
//! back to a redirect to the site list. Either way the bound [`SiteContext`]
//! is stored in the request extensions and handlers pick it up through
//! [`CurrentSite`].

use axum::extract::{FromRequestParts, Query, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::debug;

use crate::entity::catalog::site;
use crate::error::{AppError, SsgError};
use crate::repo::SiteRepo;
use crate::state::AppState;

pub const SITE_HEADER: &str = "x-site-slug";
pub const SITE_COOKIE: &str = "last_site";
pub const SITE_QUERY: &str = "site";
pub const SITES_PAGE: &str = "/ssg/sites";

const COOKIE_MAX_AGE_DAYS: i64 = 365;

/// The site a request operates on.
#[derive(Clone)]
pub struct SiteContext {
    pub site: site::Model,
    pub repo: SiteRepo,
}

impl SiteContext {
    pub fn slug(&self) -> &str {
        &self.site.slug
    }
}

async fn bind(state: &AppState, slug: &str) -> Result<SiteContext, SsgError> {
    let site = state.sites.get_by_slug(slug).await?;
    let repo = state.repos.acquire(&site.slug).await?;
    Ok(SiteContext { site, repo })
}

fn usable(slug: Option<&str>) -> Option<&str> {
    slug.map(str::trim).filter(|s| !s.is_empty())
}

/// Middleware for `/api/v1/ssg` routes that act on one site.
pub async fn bind_api_site(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(SITE_HEADER)
        .and_then(|v| v.to_str().ok());
    let slug = usable(header)
        .ok_or_else(|| AppError::BadRequest("Missing X-Site-Slug header".into()))?
        .to_string();

    let ctx = bind(&state, &slug).await?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

#[derive(Debug, Default, Deserialize)]
pub struct SiteQuery {
    pub site: Option<String>,
}

/// Middleware for `/ssg` screens. Refreshes the `last_site` cookie on success.
pub async fn bind_web_site(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<SiteQuery>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let cookie_site = jar.get(SITE_COOKIE).map(|c| c.value().to_owned());
    let candidates = [
        usable(query.site.as_deref()),
        usable(cookie_site.as_deref()),
    ];

    for slug in candidates.into_iter().flatten() {
        match bind(&state, slug).await {
            Ok(ctx) => {
                let cookie = site_cookie(ctx.slug().to_string());
                req.extensions_mut().insert(ctx);
                let response = next.run(req).await;
                return Ok((jar.add(cookie), response).into_response());
            }
            Err(SsgError::NotFound(_)) => {
                debug!(slug, "Ignoring unknown site slug");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Redirect::to(SITES_PAGE).into_response())
}

pub fn site_cookie(slug: String) -> Cookie<'static> {
    Cookie::build((SITE_COOKIE, slug))
        .path("/")
        .max_age(time::Duration::days(COOKIE_MAX_AGE_DAYS))
        .same_site(SameSite::Lax)
        .http_only(true)
        .build()
}

/// The bound site. Missing context means a route was mounted without a binder.
pub struct CurrentSite(pub SiteContext);

impl<S> FromRequestParts<S> for CurrentSite
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SiteContext>()
            .cloned()
            .map(CurrentSite)
            .ok_or_else(|| AppError::Internal("no site repository in context".into()))
    }
}
