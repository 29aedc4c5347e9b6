use std::sync::Arc;

use chrono::Utc;
use rolegrid_application::{
    AssignmentEngine, PermissionRepository, RoleRepository, StoreAdapter, UserDirectory,
};
use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{Identity, UserId};
use rolegrid_infrastructure::{
    InMemoryStore, InMemoryUserDirectory, PostgresStore, PostgresUserDirectory,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::api_config::StoreBackend;
use crate::state::AppState;

pub async fn connect_and_migrate(database_url: &str, max_connections: u32) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    info!("database migrations applied successfully");
    Ok(pool)
}

pub async fn build_app_state(backend: &StoreBackend) -> AppResult<AppState> {
    let (store, directory): (Arc<dyn StoreAdapter>, Arc<dyn UserDirectory>) = match backend {
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = connect_and_migrate(database_url, *max_connections).await?;
            let store: Arc<dyn StoreAdapter> = Arc::new(PostgresStore::new(pool.clone()));
            let directory: Arc<dyn UserDirectory> = Arc::new(PostgresUserDirectory::new(pool));
            (store, directory)
        }
        StoreBackend::Memory { seed_users } => {
            info!(users = seed_users.len(), "using in-memory store");
            let identities = seed_users
                .iter()
                .map(|user_id| Identity {
                    id: UserId::new(user_id.as_str()),
                    email: None,
                    created_at: Utc::now(),
                })
                .collect();
            let store: Arc<dyn StoreAdapter> = Arc::new(InMemoryStore::new());
            let directory: Arc<dyn UserDirectory> =
                Arc::new(InMemoryUserDirectory::new(identities));
            (store, directory)
        }
    };

    Ok(AppState {
        permission_repository: PermissionRepository::new(store.clone()),
        role_repository: RoleRepository::new(store.clone()),
        assignment_engine: AssignmentEngine::new(store, directory),
        store_backend: backend.name(),
    })
}
