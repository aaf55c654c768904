use serde::Deserialize;

use super::config::AppConfig;
use crate::error::AppError;

pub const DEFAULT_APP_NAME: &str = "Vågnes Konkordans";
pub const DEFAULT_METADATA_FILE: &str = "Øyvind_Vågnes - Korpus.csv";

/// Raw shape of `app.manifest.json`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub app_name: Option<String>,
    pub api: Option<ManifestApi>,
    pub corpus: Option<ManifestCorpus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestApi {
    pub concordance_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestCorpus {
    pub metadata_file: Option<String>,
}

/// Manifest values with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifest {
    pub app_name: String,
    pub concordance_url: String,
    pub metadata_file: String,
}

impl Manifest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(bytes)
            .map_err(|e| AppError::Config(format!("could not parse manifest: {e}")))
    }

    pub fn resolve(&self, config: &AppConfig) -> ResolvedManifest {
        ResolvedManifest {
            app_name: non_blank(self.app_name.as_deref())
                .unwrap_or(DEFAULT_APP_NAME)
                .to_string(),
            concordance_url: non_blank(
                self.api.as_ref().and_then(|a| a.concordance_url.as_deref()),
            )
            .unwrap_or(&config.concordance_url)
            .to_string(),
            metadata_file: non_blank(
                self.corpus.as_ref().and_then(|c| c.metadata_file.as_deref()),
            )
            .unwrap_or(DEFAULT_METADATA_FILE)
            .to_string(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_manifest_overrides_everything() {
        let manifest = Manifest::from_slice(
            br#"{
                "appName": "Testkorpus",
                "api": { "concordanceUrl": " https://conc.example.com " },
                "corpus": { "metadataFile": "korpus.csv" }
            }"#,
        )
        .expect("valid manifest");

        let resolved = manifest.resolve(&AppConfig::default());
        assert_eq!(resolved.app_name, "Testkorpus");
        assert_eq!(resolved.concordance_url, "https://conc.example.com");
        assert_eq!(resolved.metadata_file, "korpus.csv");
    }

    #[test]
    fn blank_and_missing_fields_fall_back_to_defaults() {
        let manifest = Manifest::from_slice(br#"{ "appName": "   ", "api": {} }"#)
            .expect("valid manifest");
        let config = AppConfig {
            concordance_url: "https://configured.example.com/conc".into(),
            ..Default::default()
        };

        let resolved = manifest.resolve(&config);
        assert_eq!(resolved.app_name, DEFAULT_APP_NAME);
        assert_eq!(resolved.concordance_url, "https://configured.example.com/conc");
        assert_eq!(resolved.metadata_file, DEFAULT_METADATA_FILE);
    }

    #[test]
    fn malformed_manifest_is_a_config_error() {
        let result = Manifest::from_slice(b"{ not json");
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
