use branch_pipeline_core::contract::InvocationResult;
use thiserror::Error;

use crate::adapters::process::RunError;

/// Failures of a single router or probe invocation.
///
/// None of these reach the Lambda runtime: each one is converted into a
/// `500` [`InvocationResult`] by [`RouterError::to_invocation_result`].
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("failed to fetch secret '{secret_id}': {message}")]
    SecretFetch { secret_id: String, message: String },

    #[error("identity lookup failed: {0}")]
    IdentityLookup(String),

    #[error("scratch file {path} could not be written: {source}")]
    Scratch {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run child process: {0}")]
    SubprocessSpawn(String),

    #[error("lost track of child process: {0}")]
    SubprocessWait(String),

    #[error("child process exited with code {code}")]
    SubprocessNonZeroExit { code: i32 },
}

impl RouterError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEvent(_) => "malformed_event",
            Self::SecretFetch { .. } => "secret_fetch",
            Self::IdentityLookup(_) => "identity_lookup",
            Self::Scratch { .. } => "scratch_io",
            Self::SubprocessSpawn(_) => "subprocess_spawn",
            Self::SubprocessWait(_) => "subprocess_wait",
            Self::SubprocessNonZeroExit { .. } => "subprocess_non_zero_exit",
        }
    }

    pub fn to_invocation_result(&self) -> InvocationResult {
        match self {
            Self::SubprocessNonZeroExit { code } => InvocationResult::from_exit_code(*code),
            other => InvocationResult::failure(other.kind(), &other.to_string()),
        }
    }
}

impl From<RunError> for RouterError {
    fn from(error: RunError) -> Self {
        match error {
            RunError::Spawn { .. } => Self::SubprocessSpawn(error.to_string()),
            RunError::Wait { .. } => Self::SubprocessWait(error.to_string()),
        }
    }
}

/// Cold-start configuration problems. These are the only errors handed back to the runtime.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{variable} is invalid: {reason}")]
    InvalidValue {
        variable: &'static str,
        reason: String,
    },
}
