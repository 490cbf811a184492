use async_trait::async_trait;
use mentor_desk::workflows::roster::{
    AccountStore, CredentialNotifier, HttpCredentialNotifier, PersistedAccount, RosterKind,
    StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAccountStore {
    records: Arc<Mutex<HashMap<(String, String), PersistedAccount>>>,
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get(
        &self,
        collection: &str,
        email: &str,
    ) -> Result<Option<PersistedAccount>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .get(&(collection.to_string(), email.to_string()))
            .cloned())
    }

    async fn create(
        &self,
        collection: &str,
        email: &str,
        account: PersistedAccount,
    ) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let key = (collection.to_string(), email.to_string());
        if guard.contains_key(&key) {
            return Err(StoreError::Conflict {
                collection: collection.to_string(),
                email: email.to_string(),
            });
        }
        guard.insert(key, account);
        Ok(())
    }
}

type Collections = BTreeMap<String, BTreeMap<String, PersistedAccount>>;

/// Store persisted as one JSON document `{ collection: { email: account } }`, rewritten on
/// every create. Lets repeated CLI imports see earlier runs.
pub(crate) struct JsonFileAccountStore {
    path: PathBuf,
    collections: Mutex<Collections>,
}

impl JsonFileAccountStore {
    pub(crate) async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let collections = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Collections::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                StoreError::Unavailable(format!("{} is not a valid store: {err}", path.display()))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Collections::new(),
            Err(err) => {
                return Err(StoreError::Unavailable(format!(
                    "failed to read {}: {err}",
                    path.display()
                )))
            }
        };

        Ok(Self {
            path,
            collections: Mutex::new(collections),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Collections> {
        self.collections.lock().expect("store mutex poisoned")
    }
}

#[async_trait]
impl AccountStore for JsonFileAccountStore {
    async fn get(
        &self,
        collection: &str,
        email: &str,
    ) -> Result<Option<PersistedAccount>, StoreError> {
        Ok(self
            .lock()
            .get(collection)
            .and_then(|accounts| accounts.get(email))
            .cloned())
    }

    async fn create(
        &self,
        collection: &str,
        email: &str,
        account: PersistedAccount,
    ) -> Result<(), StoreError> {
        let mut staged = self.lock().clone();
        let accounts = staged.entry(collection.to_string()).or_default();
        if accounts.contains_key(email) {
            return Err(StoreError::Conflict {
                collection: collection.to_string(),
                email: email.to_string(),
            });
        }
        accounts.insert(email.to_string(), account.clone());
        let serialized = serde_json::to_vec_pretty(&staged)
            .map_err(|err| StoreError::Unavailable(format!("failed to encode store: {err}")))?;

        // The record only becomes visible once it is on disk.
        tokio::fs::write(&self.path, serialized)
            .await
            .map_err(|err| {
                StoreError::Unavailable(format!("failed to write {}: {err}", self.path.display()))
            })?;

        self.lock()
            .entry(collection.to_string())
            .or_default()
            .insert(email.to_string(), account);
        Ok(())
    }
}

/// Store selected on the command line.
pub(crate) enum ConsoleStore {
    Memory(InMemoryAccountStore),
    File(JsonFileAccountStore),
}

#[async_trait]
impl AccountStore for ConsoleStore {
    async fn get(
        &self,
        collection: &str,
        email: &str,
    ) -> Result<Option<PersistedAccount>, StoreError> {
        match self {
            ConsoleStore::Memory(store) => store.get(collection, email).await,
            ConsoleStore::File(store) => store.get(collection, email).await,
        }
    }

    async fn create(
        &self,
        collection: &str,
        email: &str,
        account: PersistedAccount,
    ) -> Result<(), StoreError> {
        match self {
            ConsoleStore::Memory(store) => store.create(collection, email, account).await,
            ConsoleStore::File(store) => store.create(collection, email, account).await,
        }
    }
}

/// Notifier selected on the command line. `Deferred` sends nothing, so every new credential
/// lands in the failure export for manual delivery.
pub(crate) enum ConsoleNotifier {
    Http(HttpCredentialNotifier),
    Deferred,
}

#[async_trait]
impl CredentialNotifier for ConsoleNotifier {
    async fn send(&self, email: &str, credential: &str) -> bool {
        match self {
            ConsoleNotifier::Http(notifier) => notifier.send(email, credential).await,
            ConsoleNotifier::Deferred => false,
        }
    }
}

pub(crate) fn parse_kind(raw: &str) -> Result<RosterKind, String> {
    RosterKind::from_str(raw).map_err(|err| err.to_string())
}
