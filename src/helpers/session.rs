// In-memory token state shared by the route handlers.
// Writes are last-writer-wins; two concurrent refreshes both succeed and the
// later one is kept.

use tokio::sync::RwLock;

use crate::data::CredentialRecord;

#[derive(Debug, Default)]
pub struct Session {
    tokens: RwLock<Option<CredentialRecord>>,
}

impl Session {
    pub fn new(initial: Option<CredentialRecord>) -> Self {
        Session {
            tokens: RwLock::new(initial),
        }
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.as_ref().map(|t| t.access_token.clone())
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.as_ref().and_then(|t| t.refresh_token.clone())
    }

    pub async fn has_token(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    /// Copy of the current record, if any
    pub async fn snapshot(&self) -> Option<CredentialRecord> {
        self.tokens.read().await.clone()
    }

    /// Replace the tokens wholesale
    pub async fn replace(&self, record: CredentialRecord) {
        *self.tokens.write().await = Some(record);
    }
}
