use axum::Router;
use axum::routing::{get, put};
use rolegrid_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, permissions, roles, users};
use crate::state::AppState;

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let api_routes = Router::new()
        .route(
            "/api/permissions",
            get(permissions::list_permissions_handler)
                .post(permissions::create_permission_handler),
        )
        .route(
            "/api/permissions/{permission_id}",
            get(permissions::get_permission_handler)
                .patch(permissions::update_permission_handler)
                .delete(permissions::delete_permission_handler),
        )
        .route(
            "/api/permissions/{permission_id}/roles",
            get(permissions::permission_roles_handler),
        )
        .route(
            "/api/roles",
            get(roles::list_roles_handler).post(roles::create_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(roles::get_role_handler)
                .patch(roles::update_role_handler)
                .delete(roles::delete_role_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions",
            put(roles::set_role_permissions_handler),
        )
        .route("/api/users", get(users::list_users_handler))
        .route("/api/users/{user_id}/roles", put(users::set_user_roles_handler))
        .route(
            "/api/users/{user_id}/permissions",
            get(users::user_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/permissions/{permission_name}",
            get(users::user_permission_check_handler),
        );

    Ok(Router::new()
        .route("/health", get(health::health_handler))
        .merge(api_routes)
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
