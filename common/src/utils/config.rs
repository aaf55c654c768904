use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONCORDANCE_URL: &str = "https://api.nb.no/dhlab/conc";
pub const DEFAULT_CATALOG_URL: &str = "https://api.nb.no/catalog/v1/items";
pub const DEFAULT_ITEM_BASE_URL: &str = "https://www.nb.no/items";

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,
    /// When set, the manifest and corpus table are fetched over HTTP relative to this URL.
    #[serde(default)]
    pub asset_base_url: Option<String>,
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    #[serde(default = "default_concordance_url")]
    pub concordance_url: String,
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    #[serde(default = "default_item_base_url")]
    pub item_base_url: String,
    #[serde(default = "default_concordance_window")]
    pub concordance_window: u32,
    #[serde(default = "default_concordance_limit")]
    pub concordance_limit: u32,
    #[serde(default = "default_html_formatting")]
    pub html_formatting: bool,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_asset_dir() -> String {
    "./public".to_string()
}

fn default_manifest_file() -> String {
    "app.manifest.json".to_string()
}

fn default_concordance_url() -> String {
    DEFAULT_CONCORDANCE_URL.to_string()
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_item_base_url() -> String {
    DEFAULT_ITEM_BASE_URL.to_string()
}

fn default_concordance_window() -> u32 {
    20
}

fn default_concordance_limit() -> u32 {
    5000
}

fn default_html_formatting() -> bool {
    true
}

fn default_export_dir() -> String {
    ".".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            asset_dir: default_asset_dir(),
            asset_base_url: None,
            manifest_file: default_manifest_file(),
            concordance_url: default_concordance_url(),
            catalog_url: default_catalog_url(),
            item_base_url: default_item_base_url(),
            concordance_window: default_concordance_window(),
            concordance_limit: default_concordance_limit(),
            html_formatting: default_html_formatting(),
            export_dir: default_export_dir(),
        }
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::with_prefix("KONKORDANS"))
        .build()?;

    config.try_deserialize()
}
