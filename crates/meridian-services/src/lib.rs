//! Backend service access for Meridian.
//!
//! Once a user is in-world, the client talks to a handful of independent
//! HTTP/JSON microservices (song engine, world engine, harmony service,
//! ...). This crate owns those connections:
//!
//! - [`ServiceRegistry`]: zero or one live [`ServiceConnection`] per
//!   [`Service`], with observable [`ConnectionStatus`].
//! - [`Endpoint`]: a typed description of one request (method, path,
//!   body).
//! - [`ServiceError`]: every failure, tagged with the service it came
//!   from.
//!
//! # Concurrency
//!
//! All registry methods take `&self`. Network I/O never happens under a
//! lock; the connection map is only locked for the instant it takes to
//! insert, remove, or clone out an entry. Fan-out operations
//! ([`ServiceRegistry::connect_to_all_services`],
//! [`ServiceRegistry::check_all_services_health`]) run every per-service
//! call concurrently and join before returning.
//!
//! The registry never retries; retry policy belongs to the caller.

mod config;
mod connection;
mod endpoint;
mod error;
mod registry;
mod status;

pub use config::RegistryConfig;
pub use connection::ServiceConnection;
pub use endpoint::Endpoint;
pub use error::ServiceError;
pub use meridian_protocol::Service;
pub use registry::{ServiceRegistry, StatusMap};
pub use status::ConnectionStatus;
