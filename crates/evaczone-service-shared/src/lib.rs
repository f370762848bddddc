//! Shared infrastructure for the evaczone HTTP service.
//!
//! This crate provides the HTTP glue between axum and `evaczone-lib`:
//!
//! - [`AppState`]: zone store plus optional outbound collaborator clients
//! - [`ProblemDetails`]: RFC 9457 Problem Details for error responses
//! - [`ServiceResponse`]: wrapper for successful responses
//! - Request types with validation for each endpoint
//! - [`health`]: liveness/readiness probe handlers
//! - [`logging`]: structured logging setup
//! - [`middleware`]: request correlation IDs
//!
//! # Architecture
//!
//! Handlers stay thin: they parse and validate the request, call
//! `evaczone-lib` APIs through [`AppState`], and format the response. All
//! zone geometry, persistence, and third-party calls live in the library.
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides a seeded in-memory state for handler
//! testing. Enable the `test-utils` feature to use it from dependent crates.

#![deny(warnings)]

mod health;
pub mod logging;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use middleware::{extract_or_generate_request_id, RequestId};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_SERVICE_UNAVAILABLE, PROBLEM_ZONE_NOT_FOUND,
};
pub use request::{
    CheckLocationRequest, CreateZoneRequest, UpdateZoneRequest, Validate, ZoneListQuery,
};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
