use std::future::Future;

use rolegrid_core::{AppError, AppResult};

use crate::error::ApiResult;

pub mod health;
pub mod permissions;
pub mod roles;
pub mod users;

/// Runs a mutation on its own task so a dropped request cannot cancel it midway.
async fn run_detached<F, T>(operation: F) -> ApiResult<T>
where
    F: Future<Output = AppResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let outcome = tokio::spawn(operation)
        .await
        .map_err(|error| AppError::Internal(format!("mutation task failed: {error}")))?;

    Ok(outcome?)
}
