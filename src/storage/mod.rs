//! Storage backends for Refinery
//!
//! Persistence goes through the `ManuscriptStore` trait. The primary
//! implementation is `SqliteStore`, a single database file holding
//! manuscripts, analysis results, edit queues, decisions and annotations.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ManuscriptStore, OpenStore, StorageError, StorageResult};
