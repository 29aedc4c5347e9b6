use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use rolegrid_application::{CreateRoleInput, UpdateRoleInput};
use rolegrid_domain::{PermissionId, RoleId, RoleWithPermissions};

use super::run_detached;
use crate::dto::{CreateRoleRequest, RoleResponse, SetRolePermissionsRequest, UpdateRoleRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .assignment_engine
        .get_all_roles_with_permissions()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let repository = state.role_repository.clone();
    let role = run_detached(async move {
        repository
            .create(CreateRoleInput { name: payload.name })
            .await
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RoleResponse::from(RoleWithPermissions {
            role,
            permissions: Vec::new(),
        })),
    ))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .assignment_engine
        .get_role_with_permissions(&RoleId::new(role_id))
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role_id = RoleId::new(role_id);
    let repository = state.role_repository.clone();
    let target = role_id.clone();
    run_detached(async move {
        repository
            .update(&target, UpdateRoleInput { name: payload.name })
            .await
    })
    .await?;

    let role = state
        .assignment_engine
        .get_role_with_permissions(&role_id)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<StatusCode> {
    let repository = state.role_repository.clone();
    run_detached(async move { repository.delete(&RoleId::new(role_id)).await }).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_role_permissions_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
    Json(payload): Json<SetRolePermissionsRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role_id = RoleId::new(role_id);
    let permission_ids: Vec<PermissionId> = payload
        .permission_ids
        .into_iter()
        .map(PermissionId::from)
        .collect();

    let engine = state.assignment_engine.clone();
    let target = role_id.clone();
    run_detached(async move {
        engine
            .set_role_permissions(&target, &permission_ids)
            .await
    })
    .await?;

    let role = state
        .assignment_engine
        .get_role_with_permissions(&role_id)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}
