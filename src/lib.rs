/// HTTP routes and the Rocket server
pub mod api;

/// Configuration file, environment overrides and validation
pub mod config;

pub mod constants;

/// Shared state of the running server
pub mod context;

/// Data types for credentials and control commands
pub mod data;

/// Start page selection for the desktop launcher
pub mod desktop;

/// OAuth, access guard, control relay and process helpers
pub mod helpers;

pub mod logging;

pub use context::ControlContext;
pub use data::{ControlCommand, CredentialRecord};
