pub mod loader;
pub mod source;
pub mod table;
pub mod thumbnails;

pub use loader::{CorpusLoader, LoadedCorpus};
pub use source::{AssetSource, HttpAssetSource, LocalAssetSource};
pub use thumbnails::{CatalogClient, NbCatalogClient, ThumbnailResolver};
