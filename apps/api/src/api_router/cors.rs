use axum::http::header::{CONTENT_TYPE, HeaderValue};
use axum::http::Method;
use rolegrid_core::AppError;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Builds the CORS layer for the admin frontend.
///
/// `frontend_origins` is a comma-separated origin list; blank entries are skipped.
pub(super) fn build_cors_layer(frontend_origins: &str) -> Result<CorsLayer, AppError> {
    let origins = parse_origins(frontend_origins)?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]))
}

fn parse_origins(frontend_origins: &str) -> Result<Vec<HeaderValue>, AppError> {
    let origins = frontend_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|error| {
                AppError::Validation(format!("invalid FRONTEND_URL origin '{origin}': {error}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if origins.is_empty() {
        return Err(AppError::Validation(
            "FRONTEND_URL must name at least one origin".to_owned(),
        ));
    }

    Ok(origins)
}
