//! Cache decorators for the read repositories.

mod bible;
mod song;

pub use bible::CachedBibleRepository;
pub use song::CachedSongRepository;
