use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{audio::SUPPORTED_BIT_DEPTHS, Result, StemLayout, StemshiftError};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub stems: StemConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    /// Loads a JSON config file. Missing sections fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_BIT_DEPTHS.contains(&self.export.bits_per_sample) {
            return Err(StemshiftError::Config(format!(
                "export.bits_per_sample must be one of {:?}, got {}",
                SUPPORTED_BIT_DEPTHS, self.export.bits_per_sample
            )));
        }
        Ok(())
    }
}

/// Where the external splitter left its stems and which stems it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StemConfig {
    pub layout: StemLayout,
    pub dir: PathBuf,
}

impl Default for StemConfig {
    fn default() -> Self {
        Self {
            layout: StemLayout::Five,
            dir: PathBuf::from("stems"),
        }
    }
}

/// Intermediate export of saved tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub bits_per_sample: u16,
    pub work_dir: PathBuf,
    /// Keep the exported intermediates after merging.
    pub preserve_intermediates: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            bits_per_sample: 16,
            work_dir: PathBuf::from("stemshift-work"),
            preserve_intermediates: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "stems": { "layout": "four" } }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.stems.layout, StemLayout::Four);
        assert_eq!(config.stems.dir, PathBuf::from("stems"));
        assert_eq!(config.export.bits_per_sample, 16);
        assert!(!config.export.preserve_intermediates);
    }

    #[test]
    fn rejects_unsupported_bit_depths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "export": { "bits_per_sample": 8 } }"#).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap_err().kind(), "CONFIG");
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ stems: ").unwrap();

        assert_eq!(AppConfig::load(&path).unwrap_err().kind(), "JSON");
    }
}
