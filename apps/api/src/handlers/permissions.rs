use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use rolegrid_application::{CreatePermissionInput, UpdatePermissionInput};
use rolegrid_domain::PermissionId;

use super::run_detached;
use crate::dto::{
    CreatePermissionRequest, PermissionResponse, PermissionWithRolesResponse,
    UpdatePermissionRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .permission_repository
        .list()
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let repository = state.permission_repository.clone();
    let permission = run_detached(async move {
        repository
            .create(CreatePermissionInput {
                name: payload.name,
                description: payload.description,
            })
            .await
    })
    .await?;

    Ok((StatusCode::CREATED, Json(PermissionResponse::from(permission))))
}

pub async fn get_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<String>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = state
        .permission_repository
        .get(&PermissionId::new(permission_id))
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn update_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<String>,
    Json(payload): Json<UpdatePermissionRequest>,
) -> ApiResult<Json<PermissionResponse>> {
    let repository = state.permission_repository.clone();
    let permission = run_detached(async move {
        repository
            .update(
                &PermissionId::new(permission_id),
                UpdatePermissionInput {
                    name: payload.name,
                    description: payload.description,
                },
            )
            .await
    })
    .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn delete_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<String>,
) -> ApiResult<StatusCode> {
    let repository = state.permission_repository.clone();
    run_detached(async move { repository.delete(&PermissionId::new(permission_id)).await })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn permission_roles_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<String>,
) -> ApiResult<Json<PermissionWithRolesResponse>> {
    let aggregated = state
        .assignment_engine
        .get_permission_with_roles(&PermissionId::new(permission_id))
        .await?;

    Ok(Json(PermissionWithRolesResponse::from(aggregated)))
}
