use tracing::{info, warn};

use super::records::{InsertOutcome, PersonalRecord, PersonalRecordBook, RecordStore};
use super::submit::ScoreSubmitter;

/// Local top-N book plus its store and the optional remote submitter. Local
/// persistence never depends on the remote submission succeeding.
pub struct RecordLedger {
    store: Box<dyn RecordStore>,
    book: PersonalRecordBook,
    submitter: Option<ScoreSubmitter>,
}

impl RecordLedger {
    /// Loads the persisted list. A store that cannot be read starts the
    /// ledger empty instead of failing the match.
    pub fn open(store: Box<dyn RecordStore>, capacity: usize) -> Self {
        let encoded = match store.load_encoded() {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(error = %error, "record_store_load_failed");
                Vec::new()
            }
        };
        let book = PersonalRecordBook::from_encoded(capacity, &encoded);
        info!(records = book.entries().len(), "record_ledger_opened");
        Self {
            store,
            book,
            submitter: None,
        }
    }

    pub fn with_submitter(mut self, submitter: ScoreSubmitter) -> Self {
        self.submitter = Some(submitter);
        self
    }

    pub fn book(&self) -> &PersonalRecordBook {
        &self.book
    }

    pub fn record_match(&mut self, record: PersonalRecord) -> InsertOutcome {
        let outcome = self.book.insert(record);
        info!(
            time_seconds = record.time_seconds(),
            kills = record.kills(),
            rank = ?outcome.rank,
            is_new_best = outcome.is_new_best,
            "match_recorded"
        );

        if let Err(error) = self.store.save_encoded(&self.book.to_encoded()) {
            warn!(error = %error, "record_store_save_failed");
        }
        if let Some(submitter) = &self.submitter {
            submitter.submit(record.encoded());
        }
        outcome
    }

    /// Waits for queued submissions; returns the submitter's report if any.
    pub fn close(mut self) -> Option<super::SubmissionReport> {
        self.submitter.take().map(ScoreSubmitter::shutdown)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::score::{MemoryRecordStore, RankingService, RecordStoreError, SubmitError};

    struct FailingStore;

    impl RecordStore for FailingStore {
        fn load_encoded(&self) -> Result<Vec<i64>, RecordStoreError> {
            Err(RecordStoreError::Read {
                path: PathBuf::from("records.json"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            })
        }

        fn save_encoded(&self, _encoded: &[i64]) -> Result<(), RecordStoreError> {
            Ok(())
        }
    }

    struct OfflineService {
        attempts: Arc<Mutex<u32>>,
    }

    impl RankingService for OfflineService {
        fn submit_score(&mut self, _encoded: i64) -> Result<(), SubmitError> {
            *self.attempts.lock().expect("attempts lock") += 1;
            Err(SubmitError::Unavailable("no network".to_string()))
        }
    }

    #[derive(Clone, Default)]
    struct SharedStore(Arc<MemoryRecordStore>);

    impl RecordStore for SharedStore {
        fn load_encoded(&self) -> Result<Vec<i64>, RecordStoreError> {
            self.0.load_encoded()
        }

        fn save_encoded(&self, encoded: &[i64]) -> Result<(), RecordStoreError> {
            self.0.save_encoded(encoded)
        }
    }

    #[test]
    fn recording_persists_sorted_list() {
        let store = SharedStore::default();
        let mut ledger = RecordLedger::open(Box::new(store.clone()), 10);
        ledger.record_match(PersonalRecord::new(10, 1));
        let outcome = ledger.record_match(PersonalRecord::new(125, 42));

        assert!(outcome.is_new_best);
        assert_eq!(
            store.load_encoded().expect("load"),
            vec![8_192_042, PersonalRecord::new(10, 1).encoded()]
        );
    }

    #[test]
    fn unreadable_store_starts_empty() {
        let ledger = RecordLedger::open(Box::new(FailingStore), 10);
        assert!(ledger.book().entries().is_empty());
    }

    #[test]
    fn failed_submission_keeps_local_record() {
        let attempts = Arc::new(Mutex::new(0));
        let store = SharedStore::default();
        let mut ledger = RecordLedger::open(Box::new(store.clone()), 10).with_submitter(
            ScoreSubmitter::spawn(OfflineService {
                attempts: Arc::clone(&attempts),
            }),
        );
        ledger.record_match(PersonalRecord::new(60, 3));
        let report = ledger.close().expect("report");

        assert_eq!(report.failed, 1);
        assert_eq!(*attempts.lock().expect("attempts lock"), 1);
        assert_eq!(store.load_encoded().expect("load").len(), 1);
    }
}
