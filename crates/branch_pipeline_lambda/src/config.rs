use std::path::PathBuf;

use branch_pipeline_core::command::{shell_quote, DeployCli};
use branch_pipeline_core::contract::ProtectedBranches;
use branch_pipeline_core::credentials::DEFAULT_SECRET_PREFIX;
use branch_pipeline_core::scratch_files::{CDK_CONFIG_PATH, DEFAULT_CDK_APP};

use crate::error::ConfigError;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_SCRATCH_DIR: &str = "/tmp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub default_region: String,
    pub scratch_dir: PathBuf,
    pub secret_prefix: String,
    pub protected_branches: ProtectedBranches,
    pub deploy_cli: DeployCli,
    pub cdk_app: String,
    pub probe_command: String,
}

impl RouterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let scratch_dir = PathBuf::from(
            var("SCRATCH_DIR").unwrap_or_else(|| DEFAULT_SCRATCH_DIR.to_string()),
        );

        let protected_branches = match var("PROTECTED_BRANCHES") {
            Some(value) => {
                ProtectedBranches::from_csv(&value).ok_or_else(|| ConfigError::InvalidValue {
                    variable: "PROTECTED_BRANCHES",
                    reason: "must list at least one branch name".to_string(),
                })?
            }
            None => ProtectedBranches::default(),
        };

        let deploy_cli = match var("DEPLOY_CLI") {
            Some(value) => DeployCli::parse(&value).ok_or_else(|| ConfigError::InvalidValue {
                variable: "DEPLOY_CLI",
                reason: "must name a program".to_string(),
            })?,
            None => DeployCli::default(),
        };

        let probe_command = var("PROBE_COMMAND")
            .unwrap_or_else(|| default_probe_command(&scratch_dir));

        Ok(Self {
            default_region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            secret_prefix: var("SECRET_PREFIX")
                .unwrap_or_else(|| DEFAULT_SECRET_PREFIX.to_string()),
            cdk_app: var("CDK_APP").unwrap_or_else(|| DEFAULT_CDK_APP.to_string()),
            scratch_dir,
            protected_branches,
            deploy_cli,
            probe_command,
        })
    }

    pub fn protected_branch_list(&self) -> String {
        self.protected_branches
            .names()
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn log_loaded(&self, component: &'static str) {
        tracing::info!(
            component,
            event = "config_loaded",
            default_region = %self.default_region,
            scratch_dir = %self.scratch_dir.display(),
            secret_prefix = %self.secret_prefix,
            protected_branches = %self.protected_branch_list(),
            deploy_cli = %self.deploy_cli.program
        );
    }
}

fn default_probe_command(scratch_dir: &std::path::Path) -> String {
    let scratch = shell_quote(&scratch_dir.display().to_string());
    let cdk_config = shell_quote(&scratch_dir.join(CDK_CONFIG_PATH).display().to_string());
    format!("pwd && ls -al {scratch} && cat {cdk_config}")
}
