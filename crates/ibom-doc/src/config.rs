use std::path::{Path, PathBuf};

use ibom_bom::{BomConfig, ConfigError, NormalizerConfig};
use serde::{Deserialize, Serialize};

/// Run configuration, usually read from `ibom.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LZ-compress the embedded document.
    pub compression: bool,
    /// Keep `tracks` and `zones` in the document.
    pub include_tracks: bool,
    pub include_nets: bool,
    /// Output directory, relative to the board file unless absolute.
    pub bom_dest_dir: PathBuf,
    /// Output file name template, see [`crate::naming::bom_file_name`].
    pub bom_name_format: String,
    pub bom: BomConfig,
    pub normalizer: NormalizerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compression: true,
            include_tracks: false,
            include_nets: false,
            bom_dest_dir: PathBuf::from("bom/"),
            bom_name_format: "ibom".to_string(),
            bom: BomConfig::default(),
            normalizer: NormalizerConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(text)?;
        config.bom.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Directory the output goes to for a board file at `pcb_file`.
    pub fn output_dir(&self, pcb_file: &Path) -> PathBuf {
        if self.bom_dest_dir.is_absolute() {
            self.bom_dest_dir.clone()
        } else {
            pcb_file
                .parent()
                .unwrap_or(Path::new(""))
                .join(&self.bom_dest_dir)
        }
    }
}
