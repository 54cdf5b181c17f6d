//! AWS SDK implementations of the adapter traits.

use async_trait::async_trait;

use crate::adapters::identity::IdentityLookup;
use crate::adapters::secrets::SecretStore;

pub struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerStore {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn secret_string(&self, secret_id: &str) -> Result<String, String> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|error| format!("failed to read secret value: {error}"))?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| "secret has no string value".to_string())
    }
}

pub struct StsIdentityLookup {
    client: aws_sdk_sts::Client,
}

impl StsIdentityLookup {
    pub fn new(client: aws_sdk_sts::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityLookup for StsIdentityLookup {
    async fn account_id(&self) -> Result<String, String> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|error| format!("failed to get caller identity: {error}"))?;

        output
            .account()
            .map(str::to_string)
            .ok_or_else(|| "caller identity has no account".to_string())
    }
}
