pub mod registry;
pub mod selection;
pub mod thumbnail_cache;
pub mod types;
