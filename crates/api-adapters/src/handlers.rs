//! # Handlers
//!
//! Each handler extracts the caller and payload, delegates to `SiteService`,
//! and returns JSON. Status-code mapping happens in `ApiError`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use domains::{CommentDraft, CommentPatch, CommentView, DomainError, NewSite, SitePatch, SiteView};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{AdminCaller, AuthCaller};
use crate::metrics::CONTENT_TYPE as METRICS_CONTENT_TYPE;
use crate::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

fn unsupported(method: &str, path: String) -> ApiError {
    DomainError::Forbidden(format!("{method} operation not supported on {path}")).into()
}

// ── /sites ─────────────────────────────────────────────────────────────────

pub async fn list_sites(State(state): State<AppState>) -> ApiResult<Vec<SiteView>> {
    Ok(Json(state.sites.list_sites().await?))
}

pub async fn create_site(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    payload: Result<Json<NewSite>, JsonRejection>,
) -> ApiResult<SiteView> {
    let Json(new) = payload?;
    Ok(Json(state.sites.create_site(&caller, new).await?))
}

pub async fn update_sites(_admin: AdminCaller) -> ApiError {
    unsupported("PUT", "/sites".into())
}

pub async fn delete_all_sites(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Value> {
    let deleted = state.sites.delete_all_sites(&caller).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

// ── /sites/{site_id} ───────────────────────────────────────────────────────

pub async fn get_site(
    State(state): State<AppState>,
    site_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<SiteView> {
    let Path(site_id) = site_id?;
    Ok(Json(state.sites.get_site(site_id).await?))
}

pub async fn post_site(_admin: AdminCaller, Path(site_id): Path<String>) -> ApiError {
    unsupported("POST", format!("/sites/{site_id}"))
}

pub async fn update_site(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    site_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SitePatch>, JsonRejection>,
) -> ApiResult<SiteView> {
    let Path(site_id) = site_id?;
    let Json(patch) = payload?;
    Ok(Json(state.sites.update_site(&caller, site_id, patch).await?))
}

pub async fn delete_site(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    site_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<SiteView> {
    let Path(site_id) = site_id?;
    Ok(Json(state.sites.delete_site(&caller, site_id).await?))
}

// ── /sites/{site_id}/comments ──────────────────────────────────────────────

pub async fn list_comments(
    State(state): State<AppState>,
    site_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Vec<CommentView>> {
    let Path(site_id) = site_id?;
    Ok(Json(state.sites.list_comments(site_id).await?))
}

pub async fn add_comment(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    site_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CommentDraft>, JsonRejection>,
) -> ApiResult<SiteView> {
    let Path(site_id) = site_id?;
    let Json(draft) = payload?;
    Ok(Json(state.sites.add_comment(&caller, site_id, draft).await?))
}

pub async fn update_comments(_admin: AdminCaller, Path(site_id): Path<String>) -> ApiError {
    unsupported("PUT", format!("/sites/{site_id}/comments"))
}

pub async fn delete_all_comments(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    site_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<SiteView> {
    let Path(site_id) = site_id?;
    Ok(Json(state.sites.delete_all_comments(&caller, site_id).await?))
}

// ── /sites/{site_id}/comments/{comment_id} ─────────────────────────────────

pub async fn get_comment(
    State(state): State<AppState>,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> ApiResult<CommentView> {
    let Path((site_id, comment_id)) = ids?;
    Ok(Json(state.sites.get_comment(site_id, comment_id).await?))
}

pub async fn post_comment(
    _caller: AuthCaller,
    Path((site_id, comment_id)): Path<(String, String)>,
) -> ApiError {
    unsupported("POST", format!("/sites/{site_id}/comments/{comment_id}"))
}

pub async fn update_comment(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: Result<Json<CommentPatch>, JsonRejection>,
) -> ApiResult<SiteView> {
    let Path((site_id, comment_id)) = ids?;
    let Json(patch) = payload?;
    Ok(Json(
        state
            .sites
            .update_comment(&caller, site_id, comment_id, patch)
            .await?,
    ))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> ApiResult<SiteView> {
    let Path((site_id, comment_id)) = ids?;
    Ok(Json(
        state
            .sites
            .delete_comment(&caller, site_id, comment_id)
            .await?,
    ))
}

// ── Operational ────────────────────────────────────────────────────────────

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.metrics.render().map_err(|e| ApiError::Rejected {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("metrics encoding failed: {e}"),
    })?;
    Ok(([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], body))
}

pub async fn fallback() -> ApiError {
    ApiError::not_found("Route not found")
}
