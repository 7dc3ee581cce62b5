//! HTTP surface: extractors, handlers, and route configuration.

pub mod extractors;
pub mod handlers;
pub mod routes;
