mod entry;
mod quick_detail;

pub use entry::{EventType, JournalEntry};
pub use quick_detail::QuickDetail;
