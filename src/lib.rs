//! LocApp Photos - offline photo cache for vacation-rental welcome booklets.
//!
//! Property photos are downloaded once per reservation and kept on disk so the
//! booklet stays usable without a connection. Views resolve images through a
//! disk, memory and network tier chain.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the cache orchestrator and image adapter.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

#[cfg(test)]
mod test_support;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "locapp-photos";
