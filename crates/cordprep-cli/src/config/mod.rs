//! Configuration loading for cordprep.
//! Reads cordprep.toml from the current directory or path in CORDPREP_CONFIG env var.

use std::path::{Path, PathBuf};

use cordprep_ingestion::metadata::DEFAULT_METADATA_FILE;
use cordprep_ingestion::DEFAULT_MIN_TOKENS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub sections: SectionsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Interim data directory the corpus archive was unpacked under.
    #[serde(default = "default_unpack_dir")]
    pub unpack_dir: PathBuf,
    #[serde(default = "default_extract_dir")]
    pub extract_dir: String,
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
}

fn default_unpack_dir()    -> PathBuf { PathBuf::from("data/interim") }
fn default_extract_dir()   -> String  { "covid_nlp_20200319".to_string() }
fn default_metadata_file() -> String  { DEFAULT_METADATA_FILE.to_string() }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            unpack_dir: default_unpack_dir(),
            extract_dir: default_extract_dir(),
            metadata_file: default_metadata_file(),
        }
    }
}

impl DataConfig {
    /// Directory holding the metadata table and the category subdirectories.
    pub fn source_root(&self) -> PathBuf {
        self.unpack_dir.join(&self.extract_dir)
    }

    pub fn metadata_path(&self, source_root: &Path) -> PathBuf {
        source_root.join(&self.metadata_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsConfig {
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,
}

fn default_min_tokens() -> usize { DEFAULT_MIN_TOKENS }

impl Default for SectionsConfig {
    fn default() -> Self {
        Self { min_tokens: default_min_tokens() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf { PathBuf::from("data/processed") }

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_output_dir() }
    }
}

mod tests;

impl Config {
    /// Load configuration from cordprep.toml.
    /// Checks CORDPREP_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CORDPREP_CONFIG")
            .unwrap_or_else(|_| "cordprep.toml".to_string());

        if !Path::new(&path).exists() {
            anyhow::bail!("Config file not found: {}", path);
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.data.extract_dir.is_empty() {
            return Err(cordprep_common::CordPrepError::Config(
                "data.extract_dir must not be empty".to_string(),
            )
            .into());
        }
        Ok(config)
    }
}
