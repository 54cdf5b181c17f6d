use async_trait::async_trait;
use branch_pipeline_core::credentials::{
    secret_field, secret_id, ACCESS_KEY_ID_FIELD, SECRET_ACCESS_KEY_FIELD,
};
use secrecy::SecretString;

use crate::error::RouterError;

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn secret_string(&self, secret_id: &str) -> Result<String, String>;
}

pub struct DeployCredentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
}

pub async fn fetch_deploy_credentials(
    store: &dyn SecretStore,
    prefix: &str,
) -> Result<DeployCredentials, RouterError> {
    let access_key_id = fetch_field(store, prefix, ACCESS_KEY_ID_FIELD).await?;
    let secret_access_key = fetch_field(store, prefix, SECRET_ACCESS_KEY_FIELD).await?;

    Ok(DeployCredentials {
        access_key_id,
        secret_access_key: SecretString::from(secret_access_key),
    })
}

async fn fetch_field(
    store: &dyn SecretStore,
    prefix: &str,
    field: &str,
) -> Result<String, RouterError> {
    let id = secret_id(prefix, field);
    let to_error = |message: String| RouterError::SecretFetch {
        secret_id: id.clone(),
        message,
    };

    let secret_string = store.secret_string(&id).await.map_err(to_error)?;
    secret_field(&secret_string, field).map_err(to_error)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    struct MapSecretStore {
        values: HashMap<&'static str, &'static str>,
    }

    #[async_trait]
    impl SecretStore for MapSecretStore {
        async fn secret_string(&self, secret_id: &str) -> Result<String, String> {
            self.values
                .get(secret_id)
                .map(|value| value.to_string())
                .ok_or_else(|| format!("ResourceNotFoundException: {secret_id}"))
        }
    }

    #[tokio::test]
    async fn fetches_both_fields_under_prefix() {
        let store = MapSecretStore {
            values: HashMap::from([
                (
                    "dev/aws_access_key_id",
                    r#"{"aws_access_key_id":"AKIAEXAMPLE"}"#,
                ),
                (
                    "dev/aws_secret_access_key",
                    r#"{"aws_secret_access_key":"wJalrXUtnFEMI"}"#,
                ),
            ]),
        };

        let credentials = fetch_deploy_credentials(&store, "dev")
            .await
            .expect("credentials should load");
        assert_eq!(credentials.access_key_id, "AKIAEXAMPLE");
        assert_eq!(credentials.secret_access_key.expose_secret(), "wJalrXUtnFEMI");
    }

    #[tokio::test]
    async fn missing_secret_names_the_secret_id() {
        let store = MapSecretStore {
            values: HashMap::from([(
                "dev/aws_access_key_id",
                r#"{"aws_access_key_id":"AKIAEXAMPLE"}"#,
            )]),
        };

        let error = fetch_deploy_credentials(&store, "dev")
            .await
            .err()
            .expect("missing secret should fail");
        match error {
            RouterError::SecretFetch { secret_id, .. } => {
                assert_eq!(secret_id, "dev/aws_secret_access_key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
