pub mod archive;
pub mod error;
pub mod keys;
pub mod schema;
pub mod store;

pub use archive::Archive;
pub use error::{Result, StoreError};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
