//! API route definitions.
//!
//! This module organizes all HTTP routes for the Logchef API server.

mod health;
mod logchefql;

pub use health::health_routes;
pub use logchefql::logchefql_routes;
