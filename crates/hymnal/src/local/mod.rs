//! Local key-value stores.

mod file;
mod memory;
mod preferences;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use preferences::Preferences;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteKeyValueStore;
