use async_trait::async_trait;

/// Session supplied by the external identity provider.
///
/// Injected wherever a bearer token is needed instead of living in a
/// process-wide token getter.
#[async_trait]
pub trait SessionPort: Send + Sync {
    fn is_signed_in(&self) -> bool;

    /// Current bearer token, `None` when signed out.
    async fn bearer_token(&self) -> anyhow::Result<Option<String>>;
}
