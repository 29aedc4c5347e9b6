use axum::Json;
use axum::extract::{Path, State};

use rolegrid_core::AppError;
use rolegrid_domain::{RoleId, UserId};

use super::run_detached;
use crate::dto::{
    PermissionCheckResponse, SetUserRolesRequest, UserPermissionsResponse, UserResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .assignment_engine
        .get_users_with_roles()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn set_user_roles_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<SetUserRolesRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = UserId::new(user_id);
    let role_ids: Vec<RoleId> = payload.role_ids.into_iter().map(RoleId::from).collect();

    let engine = state.assignment_engine.clone();
    let target = user_id.clone();
    run_detached(async move { engine.set_user_roles(&target, &role_ids).await }).await?;

    let user = state
        .assignment_engine
        .get_users_with_roles()
        .await?
        .into_iter()
        .find(|user| user.identity.id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn user_permissions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserPermissionsResponse>> {
    let permissions = state
        .assignment_engine
        .get_user_permissions(&UserId::new(user_id))
        .await?;

    Ok(Json(UserPermissionsResponse::from(permissions)))
}

pub async fn user_permission_check_handler(
    State(state): State<AppState>,
    Path((user_id, permission_name)): Path<(String, String)>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let user_id = UserId::new(user_id);
    let allowed = state
        .assignment_engine
        .user_has_permission(&user_id, &permission_name)
        .await?;

    Ok(Json(PermissionCheckResponse {
        user_id: user_id.into(),
        permission: permission_name,
        allowed,
    }))
}
