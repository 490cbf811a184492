use std::io::Read;
use std::sync::Arc;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info, warn};

use super::domain::{ImportCandidate, RosterKind};
use super::normalizer::normalize_email;
use super::outcome::{ImportFailure, ImportOutcome};
use super::parser::{parse_roster, ParsedRoster};
use super::progress::{ImportObserver, RowStatus};
use super::repository::{AccountStore, CredentialNotifier};
use super::RosterImportError;

pub const DEFAULT_CREDENTIAL_LENGTH: usize = 8;

/// Reconciles parsed rosters against the account store and dispatches credentials.
///
/// Candidates are processed one at a time in input order: lookup, create and notify for a row
/// all complete before the next row starts. That keeps the counters deterministic, lets a
/// repeated address in the same file be caught as a duplicate of the first, and bounds the
/// notifier to one request in flight.
pub struct RosterImportService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    credential_length: usize,
}

impl<S, N> RosterImportService<S, N>
where
    S: AccountStore + 'static,
    N: CredentialNotifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            store,
            notifier,
            credential_length: DEFAULT_CREDENTIAL_LENGTH,
        }
    }

    pub fn with_credential_length(mut self, length: usize) -> Self {
        self.credential_length = length.max(1);
        self
    }

    /// Parse an upload and reconcile it. Only parse failures are returned as errors.
    pub async fn import_reader<R: Read>(
        &self,
        kind: RosterKind,
        reader: R,
        observer: &dyn ImportObserver,
    ) -> Result<ImportOutcome, RosterImportError> {
        let roster = parse_roster(reader, kind)?;
        Ok(self.reconcile(kind, roster, observer).await)
    }

    pub async fn reconcile(
        &self,
        kind: RosterKind,
        roster: ParsedRoster,
        observer: &dyn ImportObserver,
    ) -> ImportOutcome {
        let collection = kind.collection();
        let mut outcome = ImportOutcome::new(kind);
        outcome.skipped_count = roster.skipped;

        info!(
            collection,
            candidates = roster.candidates.len(),
            skipped = roster.skipped,
            "reconciling roster import"
        );

        for candidate in roster.candidates {
            let email = normalize_email(candidate.email());
            observer.row_pending(&email);
            let status = self
                .reconcile_candidate(collection, &email, candidate, &mut outcome)
                .await;
            observer.row_settled(&email, status);
        }

        info!(
            collection,
            imported = outcome.imported_count,
            duplicates = outcome.duplicate_count,
            notified = outcome.notified_count,
            failures = outcome.failures.len(),
            "roster import finished"
        );

        outcome
    }

    async fn reconcile_candidate(
        &self,
        collection: &str,
        email: &str,
        candidate: ImportCandidate,
        outcome: &mut ImportOutcome,
    ) -> RowStatus {
        match self.store.get(collection, email).await {
            Ok(Some(_)) => {
                debug!(collection, email, "skipping existing account");
                outcome.record_duplicate();
                return RowStatus::Idle;
            }
            Ok(None) => {}
            Err(err) => {
                warn!(collection, email, error = %err, "account lookup failed");
                outcome.record_failure(ImportFailure::persistence(email, err.to_string()));
                return RowStatus::Failed;
            }
        }

        let password = generate_credential(self.credential_length);
        let account = candidate.into_account(email.to_string(), password.clone(), Utc::now());

        if let Err(err) = self.store.create(collection, email, account).await {
            warn!(collection, email, error = %err, "account create failed");
            outcome.record_failure(ImportFailure::persistence(email, err.to_string()));
            return RowStatus::Failed;
        }
        outcome.record_imported();

        if self.notifier.send(email, &password).await {
            outcome.record_notified();
            RowStatus::Succeeded
        } else {
            warn!(collection, email, "credential notification failed");
            outcome.record_failure(ImportFailure::notification(email, password));
            RowStatus::Failed
        }
    }
}

fn generate_credential(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
pub(crate) fn generate_credential_for_tests(length: usize) -> String {
    generate_credential(length)
}
