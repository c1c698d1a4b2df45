//! Conversion summary output
//!
//! Logs a short overview of a finished run and, when requested, stores the
//! full summary as pretty-printed JSON.

use anyhow::{Context, Result};
use lhe_decoder::ConversionSummary;
use std::fs;
use std::path::Path;

/// Log the per-file breakdown and totals
pub fn log_summary(summary: &ConversionSummary) {
    for file in &summary.files {
        log::debug!(
            "  {:?}: {} events, {} particles",
            file.path,
            file.events,
            file.particles
        );
    }
    log::info!(
        "Converted {} file(s): {} events, {} final-state particles -> {:?}",
        summary.files.len(),
        summary.total_events,
        summary.total_particles,
        summary.output_file
    );
}

/// Write the summary as JSON
pub fn write_summary(summary: &ConversionSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
    fs::write(path, json).with_context(|| format!("Failed to write summary: {:?}", path))?;
    log::info!("Summary written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lhe_decoder::{FileSummary, Timestamp};
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_summary_json() {
        let summary = ConversionSummary {
            input_dir: PathBuf::from("LHE_dir"),
            output_file: PathBuf::from("output.h5"),
            files: vec![FileSummary {
                path: PathBuf::from("LHE_dir/run.lhe"),
                events: 2,
                particles: 5,
            }],
            total_events: 2,
            total_particles: 5,
            converted_at: fixed_timestamp(),
        };

        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_summary(&summary, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_events"], 2);
        assert_eq!(value["files"][0]["particles"], 5);
        assert_eq!(value["output_file"], "output.h5");
        assert_eq!(value["converted_at"], "2024-01-01T00:00:00Z");
    }

    fn fixed_timestamp() -> Timestamp {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }
}
