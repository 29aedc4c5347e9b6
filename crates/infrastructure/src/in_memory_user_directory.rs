use async_trait::async_trait;
use tokio::sync::RwLock;

use rolegrid_application::{StoreResult, UserDirectory};
use rolegrid_domain::Identity;

/// In-memory user directory seeded at startup.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    identities: RwLock<Vec<Identity>>,
}

impl InMemoryUserDirectory {
    /// Creates a directory listing `identities` in the given order.
    #[must_use]
    pub fn new(identities: Vec<Identity>) -> Self {
        Self {
            identities: RwLock::new(identities),
        }
    }

    /// Adds an identity, replacing any existing one with the same id.
    pub async fn register(&self, identity: Identity) {
        let mut identities = self.identities.write().await;
        match identities
            .iter_mut()
            .find(|existing| existing.id == identity.id)
        {
            Some(existing) => *existing = identity,
            None => identities.push(identity),
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn list_identities(&self) -> StoreResult<Vec<Identity>> {
        Ok(self.identities.read().await.clone())
    }
}
