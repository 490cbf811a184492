use serde::{Deserialize, Serialize};

use super::domain::RosterKind;

/// Suggested download name for the credential export.
pub const FAILED_CREDENTIALS_FILE_NAME: &str = "failed_credentials.csv";

const EXPORT_HEADER: &str = "Email,Password";

/// A record that needs manual follow-up after an import.
///
/// Notification failures carry the generated password so the credential can be resent by hand;
/// store failures carry the error message and never had a password generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    Notification,
    Persistence,
}

impl ImportFailure {
    pub fn notification(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Some(password.into()),
            error: None,
        }
    }

    pub fn persistence(email: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: None,
            error: Some(error.into()),
        }
    }

    pub fn cause(&self) -> FailureCause {
        if self.password.is_some() {
            FailureCause::Notification
        } else {
            FailureCause::Persistence
        }
    }
}

/// Counters and failures collected over one import call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub kind: RosterKind,
    pub imported_count: usize,
    pub duplicate_count: usize,
    pub notified_count: usize,
    /// Rows or cells dropped by validation before reconciliation.
    pub skipped_count: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportOutcome {
    pub fn new(kind: RosterKind) -> Self {
        Self {
            kind,
            imported_count: 0,
            duplicate_count: 0,
            notified_count: 0,
            skipped_count: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn record_duplicate(&mut self) {
        self.duplicate_count += 1;
    }

    pub(crate) fn record_imported(&mut self) {
        self.imported_count += 1;
    }

    pub(crate) fn record_notified(&mut self) {
        self.notified_count += 1;
    }

    pub(crate) fn record_failure(&mut self, failure: ImportFailure) {
        self.failures.push(failure);
    }

    /// Total candidates that reached reconciliation.
    pub fn processed_count(&self) -> usize {
        self.imported_count + self.duplicate_count + self.persistence_failure_count()
    }

    pub fn notification_failure_count(&self) -> usize {
        self.failures
            .iter()
            .filter(|failure| failure.cause() == FailureCause::Notification)
            .count()
    }

    pub fn persistence_failure_count(&self) -> usize {
        self.failures
            .iter()
            .filter(|failure| failure.cause() == FailureCause::Persistence)
            .count()
    }

    pub fn export_failed_credentials(&self) -> String {
        export_failed_credentials(&self.failures)
    }

    /// One-line summary for the console toast.
    pub fn summary(&self) -> ImportSummary {
        let collection = self.kind.collection();

        if self.processed_count() == 0 {
            let message = match self.kind {
                RosterKind::Teacher => "No valid emails found in the CSV file.",
                RosterKind::Student => "No valid student records found in the CSV file.",
            };
            return ImportSummary {
                message: message.to_string(),
                severity: SummarySeverity::Warning,
            };
        }

        let mut message = format!(
            "Imported {} {} successfully!",
            self.imported_count, collection
        );
        if self.duplicate_count > 0 {
            message.push_str(&format!(" {} duplicates skipped.", self.duplicate_count));
        }
        if self.notified_count < self.imported_count {
            message.push_str(&format!(
                " {} emails failed to send.",
                self.imported_count - self.notified_count
            ));
        }
        let unsaved = self.persistence_failure_count();
        if unsaved > 0 {
            message.push_str(&format!(" {unsaved} records could not be saved."));
        }

        let severity = if self.notified_count == self.imported_count && unsaved == 0 {
            SummarySeverity::Success
        } else {
            SummarySeverity::Warning
        };

        ImportSummary { message, severity }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub message: String,
    pub severity: SummarySeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySeverity {
    Success,
    Warning,
}

/// Renders the `Email,Password` export. Entries without a generated password are left out.
pub fn export_failed_credentials(failures: &[ImportFailure]) -> String {
    let rows = failures
        .iter()
        .filter_map(|failure| {
            failure
                .password
                .as_deref()
                .map(|password| format!("{},{}", failure.email, password))
        })
        .collect::<Vec<_>>();

    format!("{EXPORT_HEADER}\n{}", rows.join("\n"))
}
