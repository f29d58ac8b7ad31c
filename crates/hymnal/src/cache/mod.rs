mod layer;
mod ttl;

pub use layer::{clear_cache, fetch_with_cache};
pub use ttl::TtlCache;
