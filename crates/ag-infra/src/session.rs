use async_trait::async_trait;

use ag_core::ports::SessionPort;

/// Session backed by a token handed over at startup.
///
/// The identity provider's sign-in flow runs outside this client; whatever
/// token it produced is passed in through configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|token| !token.trim().is_empty()),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionPort for StaticSession {
    fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    async fn bearer_token(&self) -> anyhow::Result<Option<String>> {
        Ok(self.token.clone())
    }
}
