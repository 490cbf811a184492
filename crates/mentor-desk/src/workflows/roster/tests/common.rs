use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::roster::domain::PersistedAccount;
use crate::workflows::roster::repository::{AccountStore, CredentialNotifier, StoreError};
use crate::workflows::roster::service::RosterImportService;

pub(super) const TEACHER_ROWS: &str = "a@x.com\n\nBAD\nb@x.com\n";

pub(super) const STUDENT_ROWS: &str = "email,name,phone,department,year,division,rollno\n\
s1@x.com,Asha Rao,9000000001,Computer,Second Year,A,101\n\
s2@x.com,Ben Ortiz,,IT,Third Year,B,102\n\
s3@x.com,Chen Li,9000000003,IT,Third Year,B,103\n";

#[derive(Default)]
pub(super) struct MemoryStore {
    records: Mutex<HashMap<(String, String), PersistedAccount>>,
    failing_lookups: HashSet<String>,
    failing_creates: HashSet<String>,
}

impl MemoryStore {
    pub(super) fn failing_lookup_for(emails: &[&str]) -> Self {
        Self {
            failing_lookups: emails.iter().map(|email| email.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(super) fn failing_create_for(emails: &[&str]) -> Self {
        Self {
            failing_creates: emails.iter().map(|email| email.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(super) fn seed(&self, collection: &str, account: PersistedAccount) {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert((collection.to_string(), account.email.clone()), account);
    }

    pub(super) fn record(&self, collection: &str, email: &str) -> Option<PersistedAccount> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .get(&(collection.to_string(), email.to_string()))
            .cloned()
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("store mutex poisoned").len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get(
        &self,
        collection: &str,
        email: &str,
    ) -> Result<Option<PersistedAccount>, StoreError> {
        if self.failing_lookups.contains(email) {
            return Err(StoreError::Unavailable("lookup timed out".to_string()));
        }
        Ok(self.record(collection, email))
    }

    async fn create(
        &self,
        collection: &str,
        email: &str,
        account: PersistedAccount,
    ) -> Result<(), StoreError> {
        if self.failing_creates.contains(email) {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
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

/// Records every dispatch and fails for the configured addresses.
#[derive(Default)]
pub(super) struct ScriptedNotifier {
    failing: HashSet<String>,
    sent: Mutex<Vec<(String, String)>>,
}

impl ScriptedNotifier {
    pub(super) fn failing_for(emails: &[&str]) -> Self {
        Self {
            failing: emails.iter().map(|email| email.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(super) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

#[async_trait]
impl CredentialNotifier for ScriptedNotifier {
    async fn send(&self, email: &str, credential: &str) -> bool {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push((email.to_string(), credential.to_string()));
        !self.failing.contains(email)
    }
}

pub(super) fn build_service(
    store: MemoryStore,
    notifier: ScriptedNotifier,
) -> (
    RosterImportService<MemoryStore, ScriptedNotifier>,
    Arc<MemoryStore>,
    Arc<ScriptedNotifier>,
) {
    let store = Arc::new(store);
    let notifier = Arc::new(notifier);
    let service = RosterImportService::new(store.clone(), notifier.clone());
    (service, store, notifier)
}

pub(super) fn existing_student(email: &str, mentor: &str) -> PersistedAccount {
    PersistedAccount {
        email: email.to_string(),
        name: Some("Existing Student".to_string()),
        password: "keepme01".to_string(),
        phone_number: Some("9111111111".to_string()),
        department: Some("Computer".to_string()),
        year: Some("Second Year".to_string()),
        division: Some("A".to_string()),
        batch: Some("B1".to_string()),
        roll_number: Some("77".to_string()),
        address: Some("12 Hill Road".to_string()),
        parent_phone: Some("9222222222".to_string()),
        created_at: Utc
            .with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
        mentor_email: Some(mentor.to_string()),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
