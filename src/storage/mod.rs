//! Project storage
//!
//! Stores implement the `ProjectStore` trait. `SqliteStore` is the
//! persistent backend; `MemoryStore` serves tests and sessions that run
//! without a database.

mod memory;
mod record;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use record::{generate_thread_id, NewProject, ProjectId, ProjectRecord, ProjectUpdate};
pub use sqlite::SqliteStore;
pub use traits::{OpenStore, ProjectStore, StorageError, StorageResult};
