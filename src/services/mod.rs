//! Service layer: one struct per store concern, each holding the injected
//! database handle.

pub mod api_keys;
pub mod history;
pub mod usage;
pub mod users;

pub use api_keys::ApiKeyService;
pub use history::HistoryService;
pub use usage::{UsageService, DEFAULT_USAGE_LIMIT};
pub use users::UserService;
