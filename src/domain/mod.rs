//! Domain layer: short URL entities, their rules, and storage contracts.
//!
//! Nothing in here knows about HTTP or PostgreSQL.
//!
//! - [`entities`] - the short URL aggregate and its inputs
//! - [`resolver`] - authority string to [`entities::Domain`]
//! - [`enablement`] - whether a short URL may redirect right now
//! - [`renderer`] - public URL of a short URL
//! - [`repositories`] - storage traits implemented by the infrastructure layer

pub mod enablement;
pub mod entities;
pub mod errors;
pub mod renderer;
pub mod repositories;
pub mod resolver;
