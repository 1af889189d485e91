//! Booklet server API client.

mod client;
mod dto;

pub use client::{DEFAULT_API_PATH, LocAppClient};
