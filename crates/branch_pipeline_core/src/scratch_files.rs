//! Contents of the files the deploy CLI reads from the sandbox home directory.

use std::path::Path;

use serde_json::json;

pub const AWS_CONFIG_PATH: &str = ".aws/config";
pub const AWS_CREDENTIALS_PATH: &str = ".aws/credentials";
pub const CDK_CONFIG_PATH: &str = ".cdk.json";
pub const CDK_OUTPUT_DIR: &str = "cdk.out";
pub const DEFAULT_CDK_APP: &str = "node ./index.js";

pub fn render_profile_config(region: &str) -> String {
    format!("[profile default]\noutput = json\nregion = {region}\n")
}

pub fn render_credentials(access_key_id: &str, secret_access_key: &str) -> String {
    format!(
        "[default]\naws_access_key_id={access_key_id}\naws_secret_access_key={secret_access_key}\n"
    )
}

pub fn render_cdk_config(app: &str, scratch_root: &Path, account: &str, region: &str) -> String {
    let document = json!({
        "app": app,
        "output": scratch_root.join(CDK_OUTPUT_DIR).display().to_string(),
        "env": {
            "account": account,
            "region": region,
        },
        "context": {
            "@aws-cdk/core:enableStackNameDuplicates": "true",
            "aws-cdk:enableDiffNoFail": "true",
            "@aws-cdk/core:stackRelativeExports": "true",
            "@aws-cdk/aws-ecr-assets:dockerIgnoreSupport": true,
            "@aws-cdk/aws-secretsmanager:parseOwnedSecretName": true,
            "@aws-cdk/aws-kms:defaultKeyPolicies": true,
            "@aws-cdk/aws-s3:grantWriteWithoutAcl": true,
            "@aws-cdk/core:newStyleStackSynthesis": "true",
        },
    });
    format!("{document:#}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn profile_config_names_default_profile() {
        assert_eq!(
            render_profile_config("eu-west-1"),
            "[profile default]\noutput = json\nregion = eu-west-1\n"
        );
    }

    #[test]
    fn credentials_use_key_value_lines() {
        let body = render_credentials("AKIAEXAMPLE", "secret/key");
        assert_eq!(
            body,
            "[default]\naws_access_key_id=AKIAEXAMPLE\naws_secret_access_key=secret/key\n"
        );
    }

    #[test]
    fn cdk_config_embeds_account_region_and_output() {
        let body = render_cdk_config(
            DEFAULT_CDK_APP,
            Path::new("/tmp"),
            "123456789012",
            "us-east-1",
        );
        let parsed: Value = serde_json::from_str(&body).expect("cdk config should be json");

        assert_eq!(parsed["app"], "node ./index.js");
        assert_eq!(parsed["output"], "/tmp/cdk.out");
        assert_eq!(parsed["env"]["account"], "123456789012");
        assert_eq!(parsed["env"]["region"], "us-east-1");
        assert_eq!(
            parsed["context"]["@aws-cdk/core:newStyleStackSynthesis"],
            "true"
        );
    }
}
