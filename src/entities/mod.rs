//! Typed row definitions for the dashboard store.
//!
//! One module per table; relations mirror the foreign keys declared in the
//! migrations. Handlers map these models into response DTOs instead of
//! reshaping rows ad hoc.

pub mod api_key;
pub mod api_key_usage;
pub mod book;
pub mod news_item;
pub mod radio_song;
pub mod user;
