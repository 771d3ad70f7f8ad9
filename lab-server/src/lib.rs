//! Lab member registry server
//!
//! # Module structure
//!
//! - [`core`] - configuration, state, server
//! - [`db`] - SQLite pool, migrations and repositories
//! - [`registry`] - the member registry engine
//! - [`services`] - blob storage, credential hashing, notification delivery
//! - [`api`] - HTTP routes
//! - [`utils`] - logging and error re-exports

pub mod api;
pub mod core;
pub mod db;
pub mod registry;
pub mod services;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use registry::{MemberRegistry, RegistryError};
