use common::{
    error::AppError,
    storage::registry::Registry,
    utils::{
        config::AppConfig,
        manifest::{Manifest, ResolvedManifest},
    },
};
use tracing::{info, instrument};

use crate::{source::AssetSource, table::parse_table};

/// Result of a successful corpus load.
#[derive(Debug, Clone)]
pub struct LoadedCorpus {
    pub manifest: ResolvedManifest,
    pub registry: Registry,
}

/// Reads the manifest, then the corpus table it names, into a [`Registry`].
pub struct CorpusLoader<S> {
    source: S,
    manifest_file: String,
    config: AppConfig,
}

impl<S: AssetSource> CorpusLoader<S> {
    pub fn new(source: S, config: &AppConfig) -> Self {
        Self {
            source,
            manifest_file: config.manifest_file.clone(),
            config: config.clone(),
        }
    }

    #[instrument(skip_all, fields(manifest = %self.manifest_file))]
    pub async fn load(&self) -> Result<LoadedCorpus, AppError> {
        let manifest = self.load_manifest().await?;

        let table = self
            .source
            .fetch(&manifest.metadata_file)
            .await
            .map_err(|e| {
                AppError::Corpus(format!(
                    "could not read corpus file {}: {e}",
                    manifest.metadata_file
                ))
            })?;
        let registry = Registry::new(parse_table(&table)?);

        info!(
            app_name = %manifest.app_name,
            metadata_file = %manifest.metadata_file,
            documents = registry.len(),
            "corpus loaded"
        );
        Ok(LoadedCorpus { manifest, registry })
    }

    async fn load_manifest(&self) -> Result<ResolvedManifest, AppError> {
        let bytes = self
            .source
            .fetch(&self.manifest_file)
            .await
            .map_err(|e| {
                AppError::Config(format!("could not read {}: {e}", self.manifest_file))
            })?;
        Ok(Manifest::from_slice(&bytes)?.resolve(&self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockAssetSource;
    use common::utils::manifest::DEFAULT_METADATA_FILE;

    const TABLE: &str = "id,urn,year,title\n1,URN:1,1900,En\n2,URN:2,1910,To\n";

    fn source_with(manifest: &'static str, table_name: &'static str) -> MockAssetSource {
        let mut source = MockAssetSource::new();
        source
            .expect_fetch()
            .withf(|name| name == "app.manifest.json")
            .times(1)
            .returning(move |_| Ok(manifest.as_bytes().to_vec()));
        source
            .expect_fetch()
            .withf(move |name| name == table_name)
            .times(1)
            .returning(|_| Ok(TABLE.as_bytes().to_vec()));
        source
    }

    #[tokio::test]
    async fn loads_table_named_by_manifest() {
        let source = source_with(
            r#"{"appName":"Testkorpus","corpus":{"metadataFile":"korpus.csv"}}"#,
            "korpus.csv",
        );
        let loader = CorpusLoader::new(source, &AppConfig::default());

        let loaded = loader.load().await.expect("load");
        assert_eq!(loaded.manifest.app_name, "Testkorpus");
        assert_eq!(loaded.registry.len(), 2);
        assert_eq!(loaded.registry.get("2").map(|d| d.title.as_str()), Some("To"));
    }

    #[tokio::test]
    async fn empty_manifest_uses_default_table() {
        let source = source_with("{}", DEFAULT_METADATA_FILE);
        let loader = CorpusLoader::new(source, &AppConfig::default());

        let loaded = loader.load().await.expect("load");
        assert_eq!(loaded.manifest.metadata_file, DEFAULT_METADATA_FILE);
        assert_eq!(loaded.registry.len(), 2);
    }

    #[tokio::test]
    async fn unreadable_manifest_is_a_config_error() {
        let mut source = MockAssetSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|_| Err(AppError::Io(std::io::ErrorKind::NotFound.into())));
        let loader = CorpusLoader::new(source, &AppConfig::default());

        assert!(matches!(loader.load().await, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn malformed_manifest_never_reads_the_table() {
        let mut source = MockAssetSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(b"[1, 2".to_vec()));
        let loader = CorpusLoader::new(source, &AppConfig::default());

        assert!(matches!(loader.load().await, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn unreadable_table_is_a_corpus_error() {
        let mut source = MockAssetSource::new();
        source
            .expect_fetch()
            .withf(|name| name == "app.manifest.json")
            .returning(|_| Ok(b"{}".to_vec()));
        source
            .expect_fetch()
            .returning(|_| Err(AppError::Io(std::io::ErrorKind::NotFound.into())));
        let loader = CorpusLoader::new(source, &AppConfig::default());

        let err = loader.load().await.expect_err("table missing");
        assert!(matches!(err, AppError::Corpus(_)));
        assert!(err.to_string().contains(DEFAULT_METADATA_FILE));
    }

    #[tokio::test]
    async fn malformed_table_is_a_corpus_error() {
        let mut source = MockAssetSource::new();
        source
            .expect_fetch()
            .withf(|name| name == "app.manifest.json")
            .returning(|_| Ok(b"{}".to_vec()));
        source
            .expect_fetch()
            .returning(|_| Ok(b"id,urn,year,title\n1,a\n".to_vec()));
        let loader = CorpusLoader::new(source, &AppConfig::default());

        assert!(matches!(loader.load().await, Err(AppError::Corpus(_))));
    }
}
