use branch_pipeline_core::contract::InvocationResult;
use branch_pipeline_lambda::adapters::aws::{SecretsManagerStore, StsIdentityLookup};
use branch_pipeline_lambda::adapters::process::TokioCommandRunner;
use branch_pipeline_lambda::config::RouterConfig;
use branch_pipeline_lambda::handlers::branch_router::handle_branch_event;
use branch_pipeline_lambda::handlers::sandbox::HandlerDependencies;
use branch_pipeline_lambda::telemetry::init_tracing;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &HandlerDependencies<'_>,
) -> Result<InvocationResult, Error> {
    Ok(handle_branch_event(event.payload, deps).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = RouterConfig::from_env()?;
    config.log_loaded("branch_router");
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let secrets = SecretsManagerStore::new(aws_sdk_secretsmanager::Client::new(&aws_config));
    let identity = StsIdentityLookup::new(aws_sdk_sts::Client::new(&aws_config));
    let deps = HandlerDependencies {
        config: &config,
        secrets: &secrets,
        identity: &identity,
        runner: &TokioCommandRunner,
    };

    lambda_runtime::run(service_fn(|event| handle_request(event, &deps))).await
}
