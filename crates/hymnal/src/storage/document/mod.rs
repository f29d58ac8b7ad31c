//! Repositories over a [`hymnal_core::storage::DocumentStore`].

mod bible;
mod song;

pub use bible::RemoteBibleRepository;
pub use song::RemoteSongRepository;
