#![forbid(unsafe_code)]

mod cache;
mod key;

pub use cache::{CacheConfig, MdnsCache, UpdateKind};
pub use key::CacheKey;
