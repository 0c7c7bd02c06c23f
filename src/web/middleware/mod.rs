//! Middleware for the read API.

pub mod cors;

pub use cors::create_cors_layer;
