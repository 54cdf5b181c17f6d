use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use branch_pipeline_core::command::CommandSpec;

use crate::adapters::identity::IdentityLookup;
use crate::adapters::process::{CommandRunner, ExitOutcome, RunError};
use crate::adapters::secrets::SecretStore;
use crate::config::RouterConfig;

pub fn router_config(scratch_dir: &Path) -> RouterConfig {
    let scratch = scratch_dir.display().to_string();
    RouterConfig::from_lookup(|key| match key {
        "SCRATCH_DIR" => Some(scratch.clone()),
        _ => None,
    })
    .expect("test config should load")
}

pub struct StaticSecrets {
    values: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StaticSecrets {
    pub fn valid() -> Self {
        Self {
            values: HashMap::from([
                (
                    "dev/aws_access_key_id".to_string(),
                    r#"{"aws_access_key_id":"AKIAEXAMPLE"}"#.to_string(),
                ),
                (
                    "dev/aws_secret_access_key".to_string(),
                    r#"{"aws_secret_access_key":"wJalrXUtnFEMI"}"#.to_string(),
                ),
            ]),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self {
            values: HashMap::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().expect("poisoned mutex").clone()
    }
}

#[async_trait]
impl SecretStore for StaticSecrets {
    async fn secret_string(&self, secret_id: &str) -> Result<String, String> {
        self.requested
            .lock()
            .expect("poisoned mutex")
            .push(secret_id.to_string());
        self.values
            .get(secret_id)
            .cloned()
            .ok_or_else(|| format!("secret {secret_id} not found"))
    }
}

pub struct CountingIdentity {
    account: String,
    calls: AtomicUsize,
}

impl CountingIdentity {
    pub fn new(account: &str) -> Self {
        Self {
            account: account.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityLookup for CountingIdentity {
    async fn account_id(&self) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.account.clone())
    }
}

pub struct CapturingRunner {
    exit_code: i32,
    commands: Mutex<Vec<CommandSpec>>,
}

impl CapturingRunner {
    pub fn exiting_with(exit_code: i32) -> Self {
        Self {
            exit_code,
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.lock().expect("poisoned mutex").clone()
    }
}

#[async_trait]
impl CommandRunner for CapturingRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ExitOutcome, RunError> {
        self.commands
            .lock()
            .expect("poisoned mutex")
            .push(command.clone());
        Ok(ExitOutcome {
            code: Some(self.exit_code),
            stdout_lines: 0,
            stderr_lines: 0,
        })
    }
}

pub enum FailingRunner {
    Spawn,
    Wait,
}

#[async_trait]
impl CommandRunner for FailingRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ExitOutcome, RunError> {
        let program = command.program.clone();
        Err(match self {
            Self::Spawn => RunError::Spawn {
                program,
                message: "No such file or directory (os error 2)".to_string(),
            },
            Self::Wait => RunError::Wait {
                program,
                message: "Interrupted system call (os error 4)".to_string(),
            },
        })
    }
}
