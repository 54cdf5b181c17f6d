//! AWS-oriented adapters and handlers for the branch pipeline router.
//!
//! This crate owns runtime integration details (Lambda handlers, secret and
//! identity adapters, the deploy CLI child process and the scratch file cache)
//! on top of the domain primitives in `branch_pipeline_core`.

pub mod adapters;
pub mod config;
pub mod error;
pub mod handlers;
pub mod scratch;
pub mod telemetry;
