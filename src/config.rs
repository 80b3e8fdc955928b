//! Pipeline configuration.
//!
//! Configuration is layered. Each layer is a sparse TOML table deep-merged on
//! top of the previous one, so a layer only needs the keys it overrides:
//!
//! ```text
//! 1. stock defaults           (PipelineConfig::default)
//! 2. environment variables    PIECEWORK_<SECTION>_<KEY>
//! 3. local override file      ./piecework.local.toml
//! 4. home rc file             ~/.pieceworkrc
//! ```
//!
//! Later layers win. Missing files are skipped; a file that exists but does
//! not parse is an error.
//!
//! ## Options
//!
//! ```toml
//! [mongodb]
//! host = "127.0.0.1"
//! user = "mongodb"
//! database = "piecework"
//!
//! [metadata]
//! type = "file"                        # "file" | "mongodb"
//! location = "/opt/piecework/db"       # directory of the file catalog
//!
//! [storage]
//! type = "file"                        # "file" | "s3"
//!
//! [storage.file]
//! location = "/opt/piecework/webroot"
//!
//! [storage.s3]
//! # key = "..."
//! # secret = "..."
//! bucket = "dev.piecework"
//!
//! [generator]
//! work_dir = "/tmp/piecework"
//! default_piece_size = 60
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix shared by every environment variable the config reads.
pub const ENV_PREFIX: &str = "PIECEWORK";

/// Local override file, looked up in the working directory.
pub const LOCAL_OVERRIDE_FILE: &str = "piecework.local.toml";

/// Per-user rc file, looked up in the home directory.
pub const HOME_RC_FILE: &str = ".pieceworkrc";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid value for {var}: {value:?} is not a number")]
    EnvNumber { var: String, value: String },
    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Fully resolved pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Connection settings for the remote document store.
    pub mongodb: MongoConfig,
    /// Which metadata store backs the catalog.
    pub metadata: MetadataConfig,
    /// Where generated files are published.
    pub storage: StorageConfig,
    /// Local generation settings.
    pub generator: GeneratorConfig,
}

impl PipelineConfig {
    /// Validate values that serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generator.default_piece_size == 0 {
            return Err(ConfigError::Validation(
                "generator.default_piece_size must be greater than 0".into(),
            ));
        }
        if self.mongodb.database.is_empty() {
            return Err(ConfigError::Validation(
                "mongodb.database must not be empty".into(),
            ));
        }
        if self.storage.kind == StorageKind::S3 && self.storage.s3.bucket.is_empty() {
            return Err(ConfigError::Validation(
                "storage.s3.bucket must be set when storage.type is \"s3\"".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MongoConfig {
    pub host: String,
    pub user: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            user: "mongodb".to_string(),
            database: "piecework".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataKind {
    /// JSON document catalog on local disk.
    #[default]
    File,
    /// Remote MongoDB collection.
    Mongodb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    #[serde(rename = "type")]
    pub kind: MetadataKind,
    /// Directory holding the file catalog (`<database>.json`).
    pub location: PathBuf,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            kind: MetadataKind::File,
            location: PathBuf::from("/opt/piecework/db"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    S3,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(rename = "type")]
    pub kind: StorageKind,
    pub file: FileStorageConfig,
    pub s3: S3StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileStorageConfig {
    /// Root directory remote paths are resolved against.
    pub location: PathBuf,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            location: PathBuf::from("/opt/piecework/webroot"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct S3StorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    pub bucket: String,
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            key: None,
            secret: None,
            bucket: "dev.piecework".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Scratch directory for generated piece sets and shared assets.
    pub work_dir: PathBuf,
    /// Piece edge length used when `--piecesize` is not given.
    pub default_piece_size: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("piecework"),
            default_piece_size: 60,
        }
    }
}

// =============================================================================
// Layer resolution
// =============================================================================

/// One configuration layer, in precedence order (later wins).
#[derive(Debug, Clone)]
pub enum ConfigLayer {
    /// An already-parsed sparse table (e.g. from environment variables).
    Table(toml::Value),
    /// A TOML file that is skipped when it does not exist.
    OptionalFile(PathBuf),
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(PipelineConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a TOML file as a raw value. `Ok(None)` when the file does not exist.
pub fn load_optional_file(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

/// Merge `layers` over the stock defaults, deserialize and validate.
pub fn resolve_layers(layers: &[ConfigLayer]) -> Result<PipelineConfig, ConfigError> {
    let mut merged = stock_defaults_value()?;
    for layer in layers {
        let overlay = match layer {
            ConfigLayer::Table(value) => Some(value.clone()),
            ConfigLayer::OptionalFile(path) => load_optional_file(path)?,
        };
        if let Some(overlay) = overlay {
            merged = merge_toml(merged, overlay);
        }
    }
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// How an environment variable's text is typed in the TOML layer.
#[derive(Debug, Clone, Copy)]
enum EnvValue {
    Text,
    Number,
}

/// Environment variables understood by the config, as `(suffix, key path, type)`.
const ENV_KEYS: &[(&str, &[&str], EnvValue)] = &[
    ("MONGODB_HOST", &["mongodb", "host"], EnvValue::Text),
    ("MONGODB_USER", &["mongodb", "user"], EnvValue::Text),
    ("MONGODB_DATABASE", &["mongodb", "database"], EnvValue::Text),
    ("METADATA_TYPE", &["metadata", "type"], EnvValue::Text),
    ("METADATA_LOCATION", &["metadata", "location"], EnvValue::Text),
    ("STORAGE_TYPE", &["storage", "type"], EnvValue::Text),
    ("STORAGE_FILE_LOCATION", &["storage", "file", "location"], EnvValue::Text),
    ("STORAGE_S3_KEY", &["storage", "s3", "key"], EnvValue::Text),
    ("STORAGE_S3_SECRET", &["storage", "s3", "secret"], EnvValue::Text),
    ("STORAGE_S3_BUCKET", &["storage", "s3", "bucket"], EnvValue::Text),
    ("GENERATOR_WORK_DIR", &["generator", "work_dir"], EnvValue::Text),
    (
        "GENERATOR_DEFAULT_PIECE_SIZE",
        &["generator", "default_piece_size"],
        EnvValue::Number,
    ),
];

/// Build the environment layer from a variable lookup.
///
/// Takes the lookup as a function so tests can supply variables without
/// touching the process environment.
pub fn env_layer(lookup: impl Fn(&str) -> Option<String>) -> Result<toml::Value, ConfigError> {
    let mut root = toml::Value::Table(toml::map::Map::new());
    for (suffix, key_path, kind) in ENV_KEYS {
        let var = format!("{ENV_PREFIX}_{suffix}");
        let Some(raw) = lookup(&var) else {
            continue;
        };
        let value = match kind {
            EnvValue::Text => toml::Value::String(raw),
            EnvValue::Number => {
                let parsed = raw.trim().parse::<i64>().map_err(|_| ConfigError::EnvNumber {
                    var: var.clone(),
                    value: raw.clone(),
                })?;
                toml::Value::Integer(parsed)
            }
        };
        root = merge_toml(root, nested_table(key_path, value));
    }
    Ok(root)
}

/// Wrap `value` in tables so it sits at `key_path`.
fn nested_table(key_path: &[&str], value: toml::Value) -> toml::Value {
    key_path.iter().rev().fold(value, |inner, key| {
        let mut table = toml::map::Map::new();
        table.insert((*key).to_string(), inner);
        toml::Value::Table(table)
    })
}

/// The standard precedence list: environment, local override, home rc file.
pub fn default_layers() -> Result<Vec<ConfigLayer>, ConfigError> {
    let mut layers = vec![
        ConfigLayer::Table(env_layer(|var| std::env::var(var).ok())?),
        ConfigLayer::OptionalFile(PathBuf::from(LOCAL_OVERRIDE_FILE)),
    ];
    if let Some(home) = dirs::home_dir() {
        layers.push(ConfigLayer::OptionalFile(home.join(HOME_RC_FILE)));
    }
    Ok(layers)
}

/// Resolve the configuration from defaults, environment and optional files.
pub fn load_config() -> Result<PipelineConfig, ConfigError> {
    resolve_layers(&default_layers()?)
}
