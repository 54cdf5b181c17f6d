//! Branch pipeline domain primitives.
//!
//! This crate owns the branch event contract, the deploy/destroy decision,
//! deploy command construction and the rendering of the scratch files the
//! deploy CLI reads. It intentionally excludes AWS SDK and Lambda runtime
//! concerns, which live in `branch_pipeline_lambda`.

pub mod command;
pub mod contract;
pub mod credentials;
pub mod event_rule;
pub mod scratch_files;
