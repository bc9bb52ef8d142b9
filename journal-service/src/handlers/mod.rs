mod entries;
mod health;
mod quick_details;

pub use entries::{
    create_entry, create_entry_from_text, get_entry, list_entries, update_entry, upload_entry,
};
pub use health::{health_check, welcome};
pub use quick_details::{
    batch_quick_details, create_quick_detail, delete_quick_detail, list_quick_details,
    update_quick_detail,
};
