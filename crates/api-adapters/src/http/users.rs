use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{NewUser, Payment, User, UserPatch};

use super::{parse_id, AppState};
use crate::error::ApiResult;

pub(super) async fn register(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(new) = payload?;
    let user = state.services.users.register(new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub(super) async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_id("user", &id)?;
    Ok(Json(state.services.users.get(id).await?))
}

pub(super) async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let id = parse_id("user", &id)?;
    let Json(patch) = payload?;
    Ok(Json(state.services.users.update_profile(id, patch).await?))
}

/// Payment history, newest first. Unknown users yield 404 rather than `[]`.
pub(super) async fn user_payments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Payment>>> {
    let id = parse_id("user", &id)?;
    state.services.users.get(id).await?;
    Ok(Json(state.services.payments.list_for_user(id).await?))
}
