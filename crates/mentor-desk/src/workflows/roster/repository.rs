use async_trait::async_trait;

use super::domain::PersistedAccount;

/// Document store holding accounts keyed by lowercase e-mail within a named collection.
///
/// The import routine only ever reads and creates; it never updates or deletes.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(
        &self,
        collection: &str,
        email: &str,
    ) -> Result<Option<PersistedAccount>, StoreError>;

    async fn create(
        &self,
        collection: &str,
        email: &str,
        account: PersistedAccount,
    ) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {email} already exists in {collection}")]
    Conflict { collection: String, email: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Side channel delivering freshly generated credentials (the credential e-mail).
///
/// Implementations report delivery as a flag and must not fail the batch.
#[async_trait]
pub trait CredentialNotifier: Send + Sync {
    async fn send(&self, email: &str, credential: &str) -> bool;
}
