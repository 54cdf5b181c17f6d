use branch_pipeline_core::scratch_files::{
    render_cdk_config, render_credentials, render_profile_config, AWS_CONFIG_PATH,
    AWS_CREDENTIALS_PATH, CDK_CONFIG_PATH,
};
use secrecy::ExposeSecret;

use crate::adapters::identity::IdentityLookup;
use crate::adapters::process::CommandRunner;
use crate::adapters::secrets::{fetch_deploy_credentials, SecretStore};
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::scratch::{FileState, ScratchDir};

pub struct HandlerDependencies<'a> {
    pub config: &'a RouterConfig,
    pub secrets: &'a dyn SecretStore,
    pub identity: &'a dyn IdentityLookup,
    pub runner: &'a dyn CommandRunner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxReport {
    pub profile: FileState,
    pub credentials: FileState,
    pub cdk_config: FileState,
}

pub async fn prepare_sandbox(
    scratch: &ScratchDir,
    deps: &HandlerDependencies<'_>,
) -> Result<SandboxReport, RouterError> {
    let config = deps.config;

    let profile = scratch
        .ensure_file(AWS_CONFIG_PATH, || async {
            Ok(render_profile_config(&config.default_region))
        })
        .await?;

    let credentials = scratch
        .ensure_private_file(AWS_CREDENTIALS_PATH, || async {
            let credentials =
                fetch_deploy_credentials(deps.secrets, &config.secret_prefix).await?;
            Ok(render_credentials(
                &credentials.access_key_id,
                credentials.secret_access_key.expose_secret(),
            ))
        })
        .await?;

    let cdk_config = scratch
        .ensure_file(CDK_CONFIG_PATH, || async {
            let account = deps
                .identity
                .account_id()
                .await
                .map_err(RouterError::IdentityLookup)?;
            tracing::info!(
                component = "sandbox",
                event = "account_resolved",
                account = %account
            );
            Ok(render_cdk_config(
                &config.cdk_app,
                scratch.root(),
                &account,
                &config.default_region,
            ))
        })
        .await?;

    Ok(SandboxReport {
        profile,
        credentials,
        cdk_config,
    })
}
