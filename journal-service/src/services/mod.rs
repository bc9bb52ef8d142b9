pub mod database;
pub mod extraction;
pub mod providers;
pub mod storage;

pub use database::JournalDb;
pub use extraction::{EntryExtractor, ExtractedEntry};
pub use storage::{LocalStorage, S3Storage, Storage};
