use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{
    Category, CategoryPatch, DomainError, DownloadGrant, Image, ImagePatch, NewCategory, NewImage,
};
use serde::Deserialize;

use super::{parse_id, AppState};
use crate::error::ApiResult;

pub(super) async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.services.catalog.list_categories().await?))
}

pub(super) async fn category_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.services.catalog.category_by_slug(&slug).await?))
}

pub(super) async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let Json(new) = payload?;
    let category = state.services.catalog.create_category(new).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub(super) async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CategoryPatch>, JsonRejection>,
) -> ApiResult<Json<Category>> {
    let id = parse_id("category", &id)?;
    let Json(patch) = payload?;
    Ok(Json(state.services.catalog.update_category(id, patch).await?))
}

#[derive(Debug, Deserialize)]
pub(super) struct Paging {
    limit: Option<i64>,
    offset: Option<i64>,
}

pub(super) async fn list_images(
    State(state): State<AppState>,
    paging: Result<Query<Paging>, QueryRejection>,
) -> ApiResult<Json<Vec<Image>>> {
    let Query(paging) = paging?;
    Ok(Json(state.services.catalog.list_images(paging.limit, paging.offset).await?))
}

pub(super) async fn featured_images(State(state): State<AppState>) -> ApiResult<Json<Vec<Image>>> {
    Ok(Json(state.services.catalog.featured_images().await?))
}

#[derive(Debug, Deserialize)]
pub(super) struct Search {
    #[serde(default)]
    q: String,
}

pub(super) async fn search_images(
    State(state): State<AppState>,
    search: Result<Query<Search>, QueryRejection>,
) -> ApiResult<Json<Vec<Image>>> {
    let Query(search) = search?;
    Ok(Json(state.services.catalog.search_images(&search.q).await?))
}

pub(super) async fn images_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> ApiResult<Json<Vec<Image>>> {
    let category_id = parse_id("category", &category_id)?;
    Ok(Json(state.services.catalog.images_by_category(category_id).await?))
}

pub(super) async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Image>> {
    let id = parse_id("image", &id)?;
    Ok(Json(state.services.catalog.image_by_id(id).await?))
}

pub(super) async fn create_image(
    State(state): State<AppState>,
    payload: Result<Json<NewImage>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Image>)> {
    let Json(new) = payload?;
    let image = state.services.catalog.create_image(new).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

pub(super) async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ImagePatch>, JsonRejection>,
) -> ApiResult<Json<Image>> {
    let id = parse_id("image", &id)?;
    let Json(patch) = payload?;
    Ok(Json(state.services.catalog.update_image(id, patch).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Downloader {
    user_id: Option<String>,
}

pub(super) async fn download_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    downloader: Result<Query<Downloader>, QueryRejection>,
) -> ApiResult<Json<DownloadGrant>> {
    let id = parse_id("image", &id)?;
    let Query(downloader) = downloader?;
    let user_id = downloader
        .user_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_id("user", raw))
        .transpose()?;

    match state.services.downloads.authorize(id, user_id).await {
        Ok(grant) => {
            state.metrics.download(grant.watermarked);
            Ok(Json(grant))
        }
        Err(err @ DomainError::PremiumRequired(_)) => {
            state.metrics.premium_denied();
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
