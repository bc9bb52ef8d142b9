mod entries;
mod quick_details;

pub use entries::{EntryResponse, FromTextRequest, NewEntry, UpdateEntry};
pub use quick_details::{
    NewQuickDetail, QuickDetailBatch, QuickDetailChange, QuickDetailResponse, UpdateQuickDetail,
};
