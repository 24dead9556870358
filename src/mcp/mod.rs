//! Model Context Protocol surface

mod server;

pub use server::{serve_stdio, AppserverServer};
