mod error;
mod http_mapping;
pub mod paths;
mod traits;
mod types;

pub use error::{RemoteError, RemoteResult, RepositoryError, Result};
pub use http_mapping::remote_error_from_status;
pub use traits::{
    BibleRepository, DocumentStore, FavoritesStore, KeyValueStore, SongRepository,
    TransactionFn,
};
pub use types::{PrefValue, RemotePath};
