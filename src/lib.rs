//! Appserver MCP - MCP and HTTP gateway for the Appserver business-intelligence backend

pub mod config;
pub mod error;
pub mod serde_util;
pub mod types;

pub mod platform;
pub mod client;
pub mod service;
pub mod mcp;
pub mod api;

pub use client::AppserverClient;
pub use config::Config;
pub use error::{Error, Result};
pub use service::{AngleService, AppserverService};
pub use types::*;
