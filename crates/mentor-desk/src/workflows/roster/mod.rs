//! Bulk roster import: CSV parsing, reconciliation against the account store, credential
//! provisioning, and the outcome report handed back to the console.

pub mod domain;
pub(crate) mod normalizer;
pub mod notifier;
pub mod outcome;
pub mod parser;
pub mod progress;
pub mod repository;
pub mod router;
pub mod service;
pub mod template;

#[cfg(test)]
mod tests;

pub use domain::{ImportCandidate, PersistedAccount, RosterKind, StudentDetails, UnknownRosterKind};
pub use notifier::{HttpCredentialNotifier, NotifierError};
pub use outcome::{
    export_failed_credentials, FailureCause, ImportFailure, ImportOutcome, ImportSummary,
    SummarySeverity, FAILED_CREDENTIALS_FILE_NAME,
};
pub use parser::{parse_roster, ParsedRoster, STUDENT_COLUMNS};
pub use progress::{ImportObserver, ImportProgress, NoopObserver, RowStatus, RowStatusBoard};
pub use repository::{AccountStore, CredentialNotifier, StoreError};
pub use router::{roster_router, RosterRouterState};
pub use service::{RosterImportService, DEFAULT_CREDENTIAL_LENGTH};
pub use template::{template_csv, template_file_name};

/// Batch-level failure raised before any candidate is reconciled.
#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read roster file: {0}")]
    Io(#[from] std::io::Error),
    #[error("error parsing CSV file: {0}")]
    Csv(#[from] csv::Error),
    #[error("student roster is missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<&'static str> },
}
