use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;

use super::domain::RosterKind;

/// Per-row state shown next to each record while an import runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// Untouched, including rows skipped as duplicates.
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Hook invoked by the reconciliation loop around each candidate.
pub trait ImportObserver: Send + Sync {
    fn row_pending(&self, _email: &str) {}

    fn row_settled(&self, _email: &str, _status: RowStatus) {}
}

pub struct NoopObserver;

impl ImportObserver for NoopObserver {}

/// Map from record key to its latest `RowStatus`.
#[derive(Debug, Default)]
pub struct RowStatusBoard {
    rows: Mutex<BTreeMap<String, RowStatus>>,
}

impl RowStatusBoard {
    pub fn status(&self, email: &str) -> RowStatus {
        self.lock().get(email).copied().unwrap_or(RowStatus::Idle)
    }

    pub fn snapshot(&self) -> BTreeMap<String, RowStatus> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, RowStatus>> {
        // A panic while holding the lock leaves a plain map behind; keep serving it.
        self.rows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RowStatus {
    fn is_final(self) -> bool {
        matches!(self, RowStatus::Succeeded | RowStatus::Failed)
    }
}

/// A repeated address in the same upload must not hide what happened to its first occurrence,
/// so a row that already succeeded or failed keeps that status through later pending and
/// duplicate passes.
impl ImportObserver for RowStatusBoard {
    fn row_pending(&self, email: &str) {
        let mut rows = self.lock();
        if !rows.get(email).is_some_and(|status| status.is_final()) {
            rows.insert(email.to_string(), RowStatus::Pending);
        }
    }

    fn row_settled(&self, email: &str, status: RowStatus) {
        let mut rows = self.lock();
        match rows.get(email) {
            Some(previous) if previous.is_final() && !status.is_final() => {}
            _ => {
                rows.insert(email.to_string(), status);
            }
        }
    }
}

/// One board per roster kind, reset at the start of each import of that kind.
#[derive(Debug, Default)]
pub struct ImportProgress {
    teachers: RowStatusBoard,
    students: RowStatusBoard,
}

impl ImportProgress {
    pub fn board(&self, kind: RosterKind) -> &RowStatusBoard {
        match kind {
            RosterKind::Teacher => &self.teachers,
            RosterKind::Student => &self.students,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_tracks_latest_status_per_row() {
        let board = RowStatusBoard::default();
        assert_eq!(board.status("a@x.com"), RowStatus::Idle);

        board.row_pending("a@x.com");
        assert_eq!(board.status("a@x.com"), RowStatus::Pending);

        board.row_settled("a@x.com", RowStatus::Succeeded);
        board.row_settled("b@x.com", RowStatus::Failed);
        let snapshot = board.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["a@x.com"], RowStatus::Succeeded);
        assert_eq!(snapshot["b@x.com"], RowStatus::Failed);

        board.clear();
        assert!(board.snapshot().is_empty());
    }

    #[test]
    fn repeated_row_keeps_its_first_settled_status() {
        let board = RowStatusBoard::default();
        board.row_pending("dup@x.com");
        board.row_settled("dup@x.com", RowStatus::Succeeded);

        board.row_pending("dup@x.com");
        assert_eq!(board.status("dup@x.com"), RowStatus::Succeeded);
        board.row_settled("dup@x.com", RowStatus::Idle);
        assert_eq!(board.status("dup@x.com"), RowStatus::Succeeded);
    }

    #[test]
    fn progress_keeps_kinds_apart() {
        let progress = ImportProgress::default();
        progress
            .board(RosterKind::Teacher)
            .row_settled("t@x.com", RowStatus::Succeeded);

        assert!(progress.board(RosterKind::Student).snapshot().is_empty());
        assert_eq!(
            progress.board(RosterKind::Teacher).status("t@x.com"),
            RowStatus::Succeeded
        );
    }
}
