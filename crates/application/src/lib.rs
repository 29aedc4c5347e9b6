//! Application services and ports.

#![forbid(unsafe_code)]

mod assignment_engine;
mod permission_repository;
mod repository_inputs;
mod role_repository;
mod rows;
mod store_ports;

#[cfg(test)]
mod test_support;

pub use assignment_engine::AssignmentEngine;
pub use permission_repository::PermissionRepository;
pub use repository_inputs::{
    CreatePermissionInput, CreateRoleInput, UpdatePermissionInput, UpdateRoleInput,
};
pub use role_repository::RoleRepository;
pub use store_ports::{Filter, Row, StoreAdapter, StoreResult, Table, UserDirectory};
