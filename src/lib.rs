//! Jellyroll: pick a random movie from a Jellyfin library.

pub mod config;
pub mod error;
pub mod http;
pub mod jellyfin;
pub mod library;
pub mod models;
pub mod selector;
pub mod server;

pub use error::{Error, Result};
