//! Conversion configuration types
//!
//! This module defines the small set of knobs the conversion library needs.
//! Input/output locations are passed to the converter directly; everything
//! here describes *how* inputs are discovered and reported.

use serde::{Deserialize, Serialize};

/// Configuration for the converter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// File extension of LHE inputs, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Suffix appended to the extension for gzip-compressed inputs
    #[serde(default = "default_gzip_suffix")]
    pub gzip_suffix: String,

    /// Follow symbolic links while walking the input directory
    #[serde(default)]
    pub follow_links: bool,

    /// Draw a progress bar on stderr while files are processed
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

fn default_extension() -> String {
    "lhe".to_string()
}

fn default_gzip_suffix() -> String {
    "gz".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            gzip_suffix: default_gzip_suffix(),
            follow_links: false,
            show_progress: true,
        }
    }
}

impl ConvertConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the LHE file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Builder method: set the gzip suffix
    pub fn with_gzip_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.gzip_suffix = suffix.into();
        self
    }

    /// Builder method: follow symbolic links during discovery
    pub fn with_follow_links(mut self, enabled: bool) -> Self {
        self.follow_links = enabled;
        self
    }

    /// Builder method: enable or disable the progress bar
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Plain (uncompressed) suffix, e.g. `.lhe`
    pub fn plain_suffix(&self) -> String {
        format!(".{}", self.extension)
    }

    /// Compressed suffix, e.g. `.lhe.gz`
    pub fn compressed_suffix(&self) -> String {
        format!(".{}.{}", self.extension, self.gzip_suffix)
    }

    /// Check if a file name denotes an LHE input (plain or compressed)
    pub fn matches_file(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.plain_suffix()) || file_name.ends_with(&self.compressed_suffix())
    }

    /// Check if a file name denotes a gzip-compressed input
    pub fn is_compressed(&self, file_name: &str) -> bool {
        file_name.ends_with(&format!(".{}", self.gzip_suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ConvertConfig::new()
            .with_extension("lhef")
            .with_gzip_suffix("gzip")
            .with_follow_links(true)
            .with_progress(false);

        assert_eq!(config.extension, "lhef");
        assert_eq!(config.compressed_suffix(), ".lhef.gzip");
        assert!(config.follow_links);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_file_matching() {
        let config = ConvertConfig::new();

        assert!(config.matches_file("run_01.lhe"));
        assert!(config.matches_file("run_01.lhe.gz"));
        assert!(!config.matches_file("run_01.lhe.bak"));
        assert!(!config.matches_file("run_01.gz"));
        assert!(!config.matches_file("notes.txt"));
        // Suffix match is case sensitive
        assert!(!config.matches_file("RUN.LHE"));
    }

    #[test]
    fn test_compression_detection() {
        let config = ConvertConfig::new();
        assert!(config.is_compressed("events.lhe.gz"));
        assert!(!config.is_compressed("events.lhe"));
    }
}
