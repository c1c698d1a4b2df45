//! Configuration loading and merging
//!
//! Settings come from three layers: command-line flags, an optional
//! `config.toml`, and built-in defaults, in that order of precedence.

use anyhow::{Context, Result};
use lhe_decoder::ConvertConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default input directory
pub const DEFAULT_INPUT_DIR: &str = "LHE_dir";

/// Default output file
pub const DEFAULT_OUTPUT_FILE: &str = "output.h5";

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub progress: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    pub dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub gzip_suffix: Option<String>,
    #[serde(default)]
    pub follow_links: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    pub file: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

/// Command-line values that may override the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub input_dir: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub no_progress: bool,
}

/// Fully resolved run settings
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    pub summary: Option<PathBuf>,
    pub convert: ConvertConfig,
}

impl AppConfig {
    /// Combine with command-line overrides and fill in defaults
    pub fn resolve(self, overrides: Overrides) -> RunSettings {
        let mut convert = ConvertConfig::new().with_follow_links(self.input.follow_links);
        if let Some(extension) = self.input.extension {
            convert = convert.with_extension(extension);
        }
        if let Some(suffix) = self.input.gzip_suffix {
            convert = convert.with_gzip_suffix(suffix);
        }
        let progress = !overrides.no_progress && self.progress.unwrap_or(true);
        convert = convert.with_progress(progress);

        RunSettings {
            input_dir: overrides
                .input_dir
                .or(self.input.dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR)),
            output_file: overrides
                .output_file
                .or(self.output.file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            summary: overrides.summary.or(self.output.summary),
            convert,
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            progress = false

            [input]
            dir = "runs/ttbar"
            extension = "lhef"
            follow_links = true

            [output]
            file = "ttbar.h5"
            summary = "ttbar.json"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.dir, Some(PathBuf::from("runs/ttbar")));
        assert_eq!(config.input.extension.as_deref(), Some("lhef"));
        assert!(config.input.follow_links);
        assert_eq!(config.output.file, Some(PathBuf::from("ttbar.h5")));
        assert_eq!(config.progress, Some(false));
    }

    #[test]
    fn test_defaults_without_config() {
        let settings = AppConfig::default().resolve(Overrides::default());

        assert_eq!(settings.input_dir, PathBuf::from("LHE_dir"));
        assert_eq!(settings.output_file, PathBuf::from("output.h5"));
        assert_eq!(settings.summary, None);
        assert_eq!(settings.convert, ConvertConfig::default());
    }

    #[test]
    fn test_command_line_wins_over_file() {
        let config: AppConfig = toml::from_str(
            r#"
            [input]
            dir = "from_file"
            gzip_suffix = "gzip"

            [output]
            file = "from_file.h5"
        "#,
        )
        .unwrap();

        let settings = config.resolve(Overrides {
            input_dir: Some(PathBuf::from("from_cli")),
            output_file: None,
            summary: None,
            no_progress: true,
        });

        assert_eq!(settings.input_dir, PathBuf::from("from_cli"));
        assert_eq!(settings.output_file, PathBuf::from("from_file.h5"));
        assert_eq!(settings.convert.gzip_suffix, "gzip");
        assert!(!settings.convert.show_progress);
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_config(Path::new("no/such/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
