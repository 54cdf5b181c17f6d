use branch_pipeline_core::command::deploy_command;
use branch_pipeline_core::contract::{
    decide, parse_branch_event, BranchTarget, Decision, InvocationResult,
};
use serde_json::Value;

use crate::error::RouterError;
use crate::handlers::sandbox::{prepare_sandbox, HandlerDependencies};
use crate::scratch::ScratchDir;

/// Deploys or destroys the pipeline stack of the branch named in a CodeCommit
/// reference event.
///
/// Always returns a result: failures are reported as `statusCode 500`
/// rather than as errors to the runtime.
pub async fn handle_branch_event(
    event: Value,
    deps: &HandlerDependencies<'_>,
) -> InvocationResult {
    let decision = match parse_branch_event(event)
        .and_then(|event| decide(event, &deps.config.protected_branches))
    {
        Ok(value) => value,
        Err(error) => return failed(RouterError::MalformedEvent(error.message().to_string())),
    };

    let target = match decision {
        Decision::Run(target) => target,
        Decision::Skip { branch, reason } => {
            tracing::info!(
                component = "branch_router",
                event = "skipped",
                branch = %branch,
                reason = reason.as_str()
            );
            return InvocationResult::skipped(&reason, &branch);
        }
    };

    tracing::info!(
        component = "branch_router",
        event = "decision",
        account = target.account.as_deref(),
        repository = %target.repository,
        branch = %target.branch,
        reference_event = target.event_kind.as_str(),
        action = target.action.as_str(),
        approval = target.approval.flag()
    );

    match run_pipeline_action(&target, deps).await {
        Ok(()) => {
            tracing::info!(
                component = "branch_router",
                event = "completed",
                branch = %target.branch,
                action = target.action.as_str()
            );
            InvocationResult::from_exit_code(0)
        }
        Err(error) => failed(error),
    }
}

async fn run_pipeline_action(
    target: &BranchTarget,
    deps: &HandlerDependencies<'_>,
) -> Result<(), RouterError> {
    let config = deps.config;
    let scratch = ScratchDir::new(&config.scratch_dir);
    prepare_sandbox(&scratch, deps).await?;

    let region = target.region.as_deref().unwrap_or(&config.default_region);
    let command = deploy_command(&config.deploy_cli, target, region, scratch.root());
    tracing::info!(
        component = "branch_router",
        event = "command",
        command = %command.shell_line()
    );

    let outcome = deps.runner.run(&command).await?;

    match outcome.exit_code() {
        0 => Ok(()),
        code => Err(RouterError::SubprocessNonZeroExit { code }),
    }
}

fn failed(error: RouterError) -> InvocationResult {
    tracing::error!(
        component = "branch_router",
        event = "failed",
        kind = error.kind(),
        error = %error
    );
    error.to_invocation_result()
}
