pub mod object_cache;
pub mod traits;

pub use object_cache::moka::MokaCacheWrapper;
pub use traits::{CacheResult, ObjectCache};
