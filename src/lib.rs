//! Terminus Plugins Library
//!
//! Plugin discovery and registry management for the Terminus CLI: register
//! Git-hosting locations where plugins live and search them by partial or
//! complete plugin name.

pub mod config;
pub mod error;
pub mod probe;
pub mod registry;
pub mod search;
pub mod version;
