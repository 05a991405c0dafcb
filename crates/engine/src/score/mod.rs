pub mod codec;
mod ledger;
mod records;
mod submit;

pub use ledger::RecordLedger;
pub use records::{
    InsertOutcome, JsonFileRecordStore, MemoryRecordStore, PersonalRecord, PersonalRecordBook,
    RecordStore, RecordStoreError, DEFAULT_RECORD_CAPACITY,
};
pub use submit::{RankingService, ScoreSubmitter, SubmissionReport, SubmitError};
