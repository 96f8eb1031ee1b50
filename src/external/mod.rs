//! Collaborators outside the filesystem: the database, the search index and
//! the published listing manifest

pub mod database;
pub mod listing;
pub mod search;

pub use database::{Database, SqliteDatabase};
pub use listing::{load_listing, parse_listing, Listing};
pub use search::{SearchIndex, SolrIndex};
