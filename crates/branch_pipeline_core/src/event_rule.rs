use serde_json::{json, Value};

use crate::contract::{BRANCH_REFERENCE_TYPE, REFERENCE_CREATED, REFERENCE_DELETED};

pub const EVENT_SOURCE: &str = "aws.codecommit";
pub const EVENT_DETAIL_TYPE: &str = "CodeCommit Repository State Change";
pub const EVENT_RULE_NAME: &str = "CreatePipelineRule";

pub fn branch_event_rule_pattern() -> Value {
    json!({
        "source": [EVENT_SOURCE],
        "detail-type": [EVENT_DETAIL_TYPE],
        "detail": {
            "event": [REFERENCE_DELETED, REFERENCE_CREATED],
            "referenceType": [BRANCH_REFERENCE_TYPE],
        },
    })
}
