use branch_pipeline_core::command::CommandSpec;
use branch_pipeline_core::contract::InvocationResult;
use serde_json::Value;

use crate::error::RouterError;
use crate::handlers::sandbox::{prepare_sandbox, HandlerDependencies};
use crate::scratch::ScratchDir;

pub async fn handle_probe_event(
    event: Value,
    deps: &HandlerDependencies<'_>,
) -> InvocationResult {
    tracing::info!(
        component = "bootstrap_probe",
        event = "received",
        payload = %event
    );

    match run_probe(deps).await {
        Ok(()) => InvocationResult::from_exit_code(0),
        Err(error) => {
            tracing::error!(
                component = "bootstrap_probe",
                event = "failed",
                kind = error.kind(),
                error = %error
            );
            error.to_invocation_result()
        }
    }
}

async fn run_probe(deps: &HandlerDependencies<'_>) -> Result<(), RouterError> {
    let scratch = ScratchDir::new(&deps.config.scratch_dir);
    let report = prepare_sandbox(&scratch, deps).await?;
    tracing::info!(
        component = "bootstrap_probe",
        event = "sandbox_ready",
        profile = ?report.profile,
        credentials = ?report.credentials,
        cdk_config = ?report.cdk_config
    );

    let command = CommandSpec::shell(&deps.config.probe_command, scratch.root());
    let outcome = deps.runner.run(&command).await?;

    match outcome.exit_code() {
        0 => Ok(()),
        code => Err(RouterError::SubprocessNonZeroExit { code }),
    }
}
