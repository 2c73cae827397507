//! Sur - sublet repository client
//!
//! Searches, installs, builds and submits sublets for the subtle window
//! manager. The [`engine::Engine`] drives every operation; the caches,
//! archive codec, repository gateway and host notifier are its parts.

pub mod archive;
pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod host;
pub mod layout;
pub mod matcher;
pub mod spec;
pub mod ui;

pub use error::{SurError, SurResult};
