//! Main conversion API
//!
//! This module provides the primary interface for the library. The Converter
//! struct discovers LHE files below a directory, parses each of them and
//! writes the concatenated events to a single HDF5 file.

use crate::config::ConvertConfig;
use crate::input::read_lhe_text;
use crate::parser::EventReader;
use crate::types::{ConversionSummary, EventDataset, FileSummary, LheError, Result};
use crate::writer::{write_hdf5, OutputMetadata};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The main converter struct - entry point for all conversion operations
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    /// Create a new converter with the given configuration
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    /// The configuration this converter was built with
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Find every LHE file below `root`
    ///
    /// The walk is depth-first and visits the entries of each directory in
    /// lexicographic file name order, so the result is stable across runs.
    ///
    /// # Arguments
    /// * `root` - Directory to scan (subdirectories included)
    ///
    /// # Returns
    /// * `Result<Vec<PathBuf>>` - Matching files in traversal order
    pub fn discover_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        log::info!("Scanning {:?} for LHE files", root);

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(self.config.follow_links)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                LheError::io(path, source)
            })?;

            // Symlinked files are inputs too, even when links are not followed into directories
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }
            let matches = entry
                .file_name()
                .to_str()
                .map(|name| self.config.matches_file(name))
                .unwrap_or(false);
            if matches {
                log::debug!("Found input: {:?}", entry.path());
                files.push(entry.into_path());
            }
        }

        log::info!("Found {} LHE file(s)", files.len());
        Ok(files)
    }

    /// Read and parse one LHE file
    ///
    /// Any parse failure is reported together with the file path.
    pub fn process_file(&self, path: &Path) -> Result<EventDataset> {
        self.process_file_with_progress(path, &ProgressBar::hidden())
    }

    fn process_file_with_progress(&self, path: &Path, progress: &ProgressBar) -> Result<EventDataset> {
        log::info!("Processing {:?}", path);
        let text = read_lhe_text(path, &self.config)?;

        let mut dataset = EventDataset::new();
        for event in EventReader::new(&text) {
            let event = event.map_err(|source| LheError::InputFormat {
                path: path.to_path_buf(),
                source,
            })?;
            dataset.push(event);
            if dataset.len() % 1000 == 0 {
                progress.set_message(format!("{} events", dataset.len()));
            }
        }

        log::info!(
            "Parsed {} events ({} final-state particles) from {:?}",
            dataset.len(),
            dataset.num_particles(),
            path
        );
        Ok(dataset)
    }

    /// Parse every LHE file below `root` and concatenate the results
    pub fn collect(&self, root: &Path) -> Result<EventDataset> {
        self.collect_with_summary(root).map(|(dataset, _)| dataset)
    }

    fn collect_with_summary(&self, root: &Path) -> Result<(EventDataset, Vec<FileSummary>)> {
        let files = self.discover_files(root)?;
        let progress = self.progress_bar(files.len() as u64);

        let mut combined = EventDataset::new();
        let mut summaries = Vec::with_capacity(files.len());

        for path in &files {
            let dataset = match self.process_file_with_progress(path, &progress) {
                Ok(dataset) => dataset,
                Err(e) => {
                    progress.abandon_with_message(format!("failed on {}", path.display()));
                    return Err(e);
                }
            };

            summaries.push(FileSummary {
                path: path.clone(),
                events: dataset.len(),
                particles: dataset.num_particles(),
            });
            combined.extend(dataset);

            progress.set_message(format!("{} events", combined.len()));
            progress.inc(1);
        }

        progress.finish_with_message(format!("{} events", combined.len()));
        Ok((combined, summaries))
    }

    /// Convert every LHE file below `root` into one HDF5 file at `output`
    ///
    /// # Example
    /// ```no_run
    /// use lhe_decoder::{ConvertConfig, Converter};
    /// use std::path::Path;
    ///
    /// let converter = Converter::new(ConvertConfig::new());
    /// let summary = converter
    ///     .convert(Path::new("LHE_dir"), Path::new("output.h5"))
    ///     .unwrap();
    /// println!("{} events written", summary.total_events);
    /// ```
    pub fn convert(&self, root: &Path, output: &Path) -> Result<ConversionSummary> {
        let (dataset, files) = self.collect_with_summary(root)?;

        let metadata = OutputMetadata {
            num_source_files: files.len(),
        };
        write_hdf5(output, &dataset, &metadata)?;

        Ok(ConversionSummary {
            input_dir: root.to_path_buf(),
            output_file: output.to_path_buf(),
            total_events: dataset.len(),
            total_particles: dataset.num_particles(),
            files,
            converted_at: chrono::Utc::now(),
        })
    }

    fn progress_bar(&self, files: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(files);
        match ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40} {pos}/{len} files ({msg})",
        ) {
            Ok(style) => pb.set_style(style),
            Err(e) => log::debug!("Falling back to the default progress style: {}", e),
        }
        pb
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertConfig::default())
    }
}
