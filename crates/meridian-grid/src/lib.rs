//! Grid discovery for Meridian.
//!
//! A "grid" is one virtual-world deployment with its own login endpoint.
//! The [`GridDirectory`] keeps the list the user picks from on the login
//! screen: a built-in catalog of well-known grids ([`default_grids`]) plus
//! whatever the user added, minus whatever they removed.

mod defaults;
mod directory;
mod error;

pub use defaults::default_grids;
pub use directory::{GridDirectory, default_catalog_path};
pub use error::GridError;
pub use meridian_protocol::GridInfo;
