use async_trait::async_trait;

#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn account_id(&self) -> Result<String, String>;
}
