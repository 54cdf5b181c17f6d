use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const REFERENCE_CREATED: &str = "referenceCreated";
pub const REFERENCE_DELETED: &str = "referenceDeleted";
pub const BRANCH_REFERENCE_TYPE: &str = "branch";
pub const DEFAULT_PROTECTED_BRANCH: &str = "master";

/// Exit code reported when the child process was terminated by a signal.
pub const SIGNAL_EXIT_CODE: i32 = -1;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchEvent {
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub detail: Option<BranchEventDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BranchEventDetail {
    #[serde(default)]
    pub repository_name: Option<String>,
    #[serde(default)]
    pub reference_name: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub reference_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ReferenceCreated,
    ReferenceDeleted,
}

impl EventKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            REFERENCE_CREATED => Some(Self::ReferenceCreated),
            REFERENCE_DELETED => Some(Self::ReferenceDeleted),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReferenceCreated => REFERENCE_CREATED,
            Self::ReferenceDeleted => REFERENCE_DELETED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineAction {
    Deploy,
    Destroy,
}

impl PipelineAction {
    pub fn for_event(kind: EventKind) -> Self {
        match kind {
            EventKind::ReferenceCreated => Self::Deploy,
            EventKind::ReferenceDeleted => Self::Destroy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::Destroy => "destroy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalMode {
    RequireApproval,
    ForceNoApproval,
}

impl ApprovalMode {
    pub fn for_action(action: PipelineAction) -> Self {
        match action {
            PipelineAction::Deploy => Self::RequireApproval,
            PipelineAction::Destroy => Self::ForceNoApproval,
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Self::RequireApproval => "--require-approval=never",
            Self::ForceNoApproval => "--force",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedBranches {
    names: BTreeSet<String>,
}

impl ProtectedBranches {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a comma-separated list. Returns `None` when no name survives trimming.
    pub fn from_csv(value: &str) -> Option<Self> {
        let names: BTreeSet<String> = value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(Self { names })
        }
    }

    pub fn contains(&self, branch: &str) -> bool {
        self.names.contains(branch)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for ProtectedBranches {
    fn default() -> Self {
        Self::new([DEFAULT_PROTECTED_BRANCH])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTarget {
    pub account: Option<String>,
    pub region: Option<String>,
    pub repository: String,
    pub branch: String,
    pub event_kind: EventKind,
    pub action: PipelineAction,
    pub approval: ApprovalMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ProtectedBranch,
    NotABranch { reference_type: String },
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProtectedBranch => "protected_branch",
            Self::NotABranch { .. } => "not_a_branch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip { branch: String, reason: SkipReason },
    Run(BranchTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEventError {
    message: String,
}

impl MalformedEventError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for MalformedEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for MalformedEventError {}

/// Strips the segment before the first `/`; names without one are returned as is.
pub fn branch_name(reference_name: &str) -> &str {
    match reference_name.split_once('/') {
        Some((_, rest)) => rest,
        None => reference_name,
    }
}

pub fn parse_branch_event(payload: Value) -> Result<BranchEvent, MalformedEventError> {
    if !payload.is_object() {
        return Err(MalformedEventError::new(
            "Event payload must be a JSON object",
        ));
    }
    serde_json::from_value(payload)
        .map_err(|error| MalformedEventError::new(format!("Malformed event: {error}")))
}

pub fn decide(
    event: BranchEvent,
    protected: &ProtectedBranches,
) -> Result<Decision, MalformedEventError> {
    let detail = event
        .detail
        .ok_or_else(|| MalformedEventError::new("detail is required"))?;

    let repository = required_field(detail.repository_name, "detail.repositoryName")?;
    let reference_name = required_field(detail.reference_name, "detail.referenceName")?;
    let event_name = required_field(detail.event, "detail.event")?;
    let event_kind = EventKind::parse(&event_name).ok_or_else(|| {
        MalformedEventError::new(format!("Unsupported reference event '{event_name}'"))
    })?;

    let branch = branch_name(&reference_name).to_string();
    if branch.trim().is_empty() {
        return Err(MalformedEventError::new(format!(
            "referenceName '{reference_name}' does not name a branch"
        )));
    }

    if let Some(reference_type) = detail.reference_type {
        if reference_type != BRANCH_REFERENCE_TYPE {
            return Ok(Decision::Skip {
                branch,
                reason: SkipReason::NotABranch { reference_type },
            });
        }
    }

    if protected.contains(&branch) {
        return Ok(Decision::Skip {
            branch,
            reason: SkipReason::ProtectedBranch,
        });
    }

    let action = PipelineAction::for_event(event_kind);
    Ok(Decision::Run(BranchTarget {
        account: non_empty(event.account),
        region: non_empty(event.region),
        repository,
        branch,
        event_kind,
        action,
        approval: ApprovalMode::for_action(action),
    }))
}

fn required_field(value: Option<String>, name: &str) -> Result<String, MalformedEventError> {
    non_empty(value).ok_or_else(|| MalformedEventError::new(format!("{name} is required")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationResult {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Value,
}

impl InvocationResult {
    pub fn from_exit_code(exit_code: i32) -> Self {
        Self {
            status_code: if exit_code == 0 { 200 } else { 500 },
            body: Value::from(exit_code),
        }
    }

    pub fn failure(kind: &str, message: &str) -> Self {
        Self {
            status_code: 500,
            body: json!({
                "error": kind,
                "message": message,
            }),
        }
    }

    pub fn skipped(reason: &SkipReason, branch: &str) -> Self {
        Self {
            status_code: 200,
            body: json!({
                "skipped": reason.as_str(),
                "branch": branch,
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}
