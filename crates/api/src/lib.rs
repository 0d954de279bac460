//! Roofline API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! storage and notification adapters) so integration tests and the binary
//! entrypoint can both access them.

pub mod access;
pub mod audit_trail;
pub mod auth;
pub mod background;
pub mod config;
pub mod document;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod pdf;
pub mod query;
pub mod response;
pub mod routes;
pub mod snapshot;
pub mod state;
pub mod storage;
