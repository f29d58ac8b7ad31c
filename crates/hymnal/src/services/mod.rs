//! Services combining repositories, the access gate and favorites.

mod bible;
mod favorites;
mod gate;
mod premium;
mod songs;

pub use bible::BibleService;
pub use favorites::{FavoriteEvent, FavoritesRepository};
pub use gate::AccessGate;
pub use premium::PremiumStatusProvider;
pub use songs::{CatalogSnapshot, SongService};
