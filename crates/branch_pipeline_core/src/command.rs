use std::path::Path;

use crate::contract::BranchTarget;

pub const DEFAULT_DEPLOY_CLI: &str = "npx cdk";
pub const DEPLOY_PROFILE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployCli {
    pub program: String,
    pub leading_args: Vec<String>,
}

impl DeployCli {
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            leading_args: parts.collect(),
        })
    }
}

impl Default for DeployCli {
    fn default() -> Self {
        Self {
            program: "npx".to_string(),
            leading_args: vec!["cdk".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn shell(line: &str, home: &Path) -> Self {
        Self {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), line.to_string()],
            env: vec![home_env(home)],
        }
    }

    pub fn shell_line(&self) -> String {
        let exports = self
            .env
            .iter()
            .map(|(key, value)| format!("export {key}={}; ", shell_quote(value)))
            .collect::<String>();
        let invocation = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ");
        format!("{exports}{invocation}")
    }
}

pub fn deploy_command(
    cli: &DeployCli,
    target: &BranchTarget,
    region: &str,
    home: &Path,
) -> CommandSpec {
    let mut args = cli.leading_args.clone();
    args.extend(
        [
            target.action.as_str(),
            "-v",
            "--profile",
            DEPLOY_PROFILE,
            "--region",
            region,
            "--context",
        ]
        .map(str::to_string),
    );
    args.push(format!("repo={}", target.repository));
    args.push("--context".to_string());
    args.push(format!("branch={}", target.branch));
    args.push(target.approval.flag().to_string());

    CommandSpec {
        program: cli.program.clone(),
        args,
        env: vec![home_env(home)],
    }
}

fn home_env(home: &Path) -> (String, String) {
    ("HOME".to_string(), home.display().to_string())
}

pub fn shell_quote(value: &str) -> String {
    let is_plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@,+%".contains(c));
    if is_plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ApprovalMode, EventKind, PipelineAction};

    fn target(action: PipelineAction) -> BranchTarget {
        BranchTarget {
            account: None,
            region: None,
            repository: "shop".to_string(),
            branch: "feature-x".to_string(),
            event_kind: match action {
                PipelineAction::Deploy => EventKind::ReferenceCreated,
                PipelineAction::Destroy => EventKind::ReferenceDeleted,
            },
            action,
            approval: ApprovalMode::for_action(action),
        }
    }

    #[test]
    fn deploy_command_carries_context_and_approval() {
        let command = deploy_command(
            &DeployCli::default(),
            &target(PipelineAction::Deploy),
            "eu-west-1",
            Path::new("/tmp"),
        );

        assert_eq!(command.program, "npx");
        assert_eq!(
            command.args,
            vec![
                "cdk",
                "deploy",
                "-v",
                "--profile",
                "default",
                "--region",
                "eu-west-1",
                "--context",
                "repo=shop",
                "--context",
                "branch=feature-x",
                "--require-approval=never",
            ]
        );
        assert_eq!(command.env, vec![("HOME".to_string(), "/tmp".to_string())]);
    }

    #[test]
    fn destroy_command_forces() {
        let command = deploy_command(
            &DeployCli::default(),
            &target(PipelineAction::Destroy),
            "us-east-1",
            Path::new("/tmp"),
        );

        assert_eq!(command.args[1], "destroy");
        assert_eq!(command.args.last().map(String::as_str), Some("--force"));
    }

    #[test]
    fn deploy_cli_parses_program_and_leading_args() {
        let cli = DeployCli::parse("  /opt/bin/cdk   --no-color ").expect("non-empty cli");
        assert_eq!(cli.program, "/opt/bin/cdk");
        assert_eq!(cli.leading_args, vec!["--no-color"]);
        assert!(DeployCli::parse("   ").is_none());
        assert_eq!(DeployCli::parse(DEFAULT_DEPLOY_CLI), Some(DeployCli::default()));
    }

    #[test]
    fn shell_line_exports_home_and_quotes_unsafe_values() {
        let mut command = deploy_command(
            &DeployCli::default(),
            &target(PipelineAction::Deploy),
            "us-east-1",
            Path::new("/tmp"),
        );
        command.args.push("it's here".to_string());

        let line = command.shell_line();
        assert!(line.starts_with("export HOME=/tmp; npx cdk deploy"));
        assert!(line.contains("--context branch=feature-x"));
        assert!(line.ends_with(r"'it'\''s here'"));
    }

    #[test]
    fn shell_spec_wraps_line_in_sh() {
        let command = CommandSpec::shell("pwd && ls -al", Path::new("/scratch"));
        assert_eq!(command.program, "sh");
        assert_eq!(command.args, vec!["-c", "pwd && ls -al"]);
        assert_eq!(command.env[0].1, "/scratch");
    }
}
