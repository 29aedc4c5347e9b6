use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rolegrid_core::AppError;
use tracing_subscriber::EnvFilter;

/// Record store selected at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory {
        seed_users: Vec<String>,
    },
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::Memory { .. } => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub store_backend: StoreBackend,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = env::args().nth(1);
        Self::from_lookup(command.as_deref(), |name| env::var(name).ok())
    }

    fn from_lookup(
        command: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let migrate_only = command == Some("migrate");

        let database_url = lookup("DATABASE_URL").filter(|value| !value.trim().is_empty());
        let backend_name = lookup("STORE_BACKEND").unwrap_or_else(|| {
            if database_url.is_some() {
                "postgres".to_owned()
            } else {
                "memory".to_owned()
            }
        });

        let store_backend = match backend_name.trim().to_ascii_lowercase().as_str() {
            "postgres" => {
                let database_url = database_url.ok_or_else(|| {
                    AppError::Validation(
                        "DATABASE_URL is required when STORE_BACKEND is 'postgres'".to_owned(),
                    )
                })?;
                let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
                    Some(value) => value.trim().parse::<u32>().map_err(|error| {
                        AppError::Validation(format!("invalid DATABASE_MAX_CONNECTIONS: {error}"))
                    })?,
                    None => 10,
                };
                if max_connections == 0 {
                    return Err(AppError::Validation(
                        "DATABASE_MAX_CONNECTIONS must be at least 1".to_owned(),
                    ));
                }

                StoreBackend::Postgres {
                    database_url,
                    max_connections,
                }
            }
            "memory" => StoreBackend::Memory {
                seed_users: lookup("SEED_USERS")
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_owned)
                    .collect(),
            },
            other => {
                return Err(AppError::Validation(format!(
                    "STORE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        if migrate_only && !matches!(store_backend, StoreBackend::Postgres { .. }) {
            return Err(AppError::Validation(
                "the migrate command requires the postgres store backend".to_owned(),
            ));
        }

        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = match lookup("API_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?,
            None => 3001,
        };

        Ok(Self {
            migrate_only,
            store_backend,
            frontend_url,
            api_host,
            api_port,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
