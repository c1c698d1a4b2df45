//! HDF5 output
//!
//! The artifact holds two index-aligned datasets:
//! - `data`: one variable-length array of [`ParticleRecord`] per event
//! - `weights`: one `f64` per event
//!
//! The file is assembled under a temporary sibling name and only renamed onto
//! the requested path once every write succeeded and the handle is closed.

use crate::types::{EventDataset, LheError, ParticleRecord, Result};
use hdf5::types::{VarLenArray, VarLenUnicode};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the particle dataset
pub const DATA_DATASET: &str = "data";

/// Name of the weight dataset
pub const WEIGHTS_DATASET: &str = "weights";

/// Extra information stored as root attributes
#[derive(Debug, Clone, Default)]
pub struct OutputMetadata {
    pub num_source_files: usize,
}

/// Write a dataset to `path`, replacing any existing file
pub fn write_hdf5(path: &Path, dataset: &EventDataset, metadata: &OutputMetadata) -> Result<()> {
    let staging = staging_path(path);
    log::debug!("Writing HDF5 output via {:?}", staging);

    // Surface unwritable destinations as plain I/O errors before libhdf5 gets involved
    fs::File::create(&staging).map_err(|e| LheError::io(&staging, e))?;

    let written = write_file(&staging, dataset, metadata)
        .map_err(|e| LheError::output(path, e))
        .and_then(|()| fs::rename(&staging, path).map_err(|e| LheError::io(path, e)));

    if written.is_err() {
        if let Err(e) = fs::remove_file(&staging) {
            log::warn!("Could not remove partial output {:?}: {}", staging, e);
        }
    }
    written?;

    log::info!(
        "Wrote {} events ({} particles) to {:?}",
        dataset.len(),
        dataset.num_particles(),
        path
    );
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".partial");
    PathBuf::from(name)
}

fn write_file(
    path: &Path,
    dataset: &EventDataset,
    metadata: &OutputMetadata,
) -> hdf5::Result<()> {
    let file = hdf5::File::create(path)?;
    let n = dataset.len();

    {
        let rows: Vec<VarLenArray<ParticleRecord>> = dataset
            .events()
            .iter()
            .map(|particles| VarLenArray::from_slice(particles))
            .collect();

        let data = file
            .new_dataset::<VarLenArray<ParticleRecord>>()
            .shape(n)
            .create(DATA_DATASET)?;
        let weights = file.new_dataset::<f64>().shape(n).create(WEIGHTS_DATASET)?;

        // Zero-length datasets are valid but there is nothing to transfer
        if n > 0 {
            data.write_raw(rows.as_slice())?;
            weights.write_raw(dataset.weights())?;
        }

        let creator: VarLenUnicode = format!("lhe2hdf5 {}", crate::VERSION)
            .parse()
            .map_err(|e| hdf5::Error::from(format!("invalid creator string: {}", e)))?;
        file.new_attr::<VarLenUnicode>()
            .shape(())
            .create("creator")?
            .write_scalar(&creator)?;
        file.new_attr::<u64>()
            .shape(())
            .create("num_events")?
            .write_scalar(&(n as u64))?;
        file.new_attr::<u64>()
            .shape(())
            .create("num_source_files")?
            .write_scalar(&(metadata.num_source_files as u64))?;
    }

    file.flush()?;
    drop(file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;
    use tempfile::tempdir;

    fn sample_dataset() -> EventDataset {
        let muon = ParticleRecord::from_momentum(13.0, 1.0, 10.0, 0.0, 5.0, 20.0, 0.105);
        let photon = ParticleRecord::from_momentum(22.0, 1.0, 0.0, 3.0, -4.0, 5.0, 0.0);
        vec![
            Event { weight: 1.5, particles: vec![muon, photon] },
            Event { weight: -0.5, particles: vec![] },
            Event { weight: 2.0, particles: vec![photon] },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_staging_path() {
        assert_eq!(
            staging_path(Path::new("out/run.h5")),
            PathBuf::from("out/run.h5.partial")
        );
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.h5");
        let dataset = sample_dataset();

        write_hdf5(&path, &dataset, &OutputMetadata { num_source_files: 1 }).unwrap();
        assert!(!staging_path(&path).exists());

        let file = hdf5::File::open(&path).unwrap();
        let weights = file.dataset(WEIGHTS_DATASET).unwrap().read_raw::<f64>().unwrap();
        assert_eq!(weights, vec![1.5, -0.5, 2.0]);

        let rows = file
            .dataset(DATA_DATASET)
            .unwrap()
            .read_raw::<VarLenArray<ParticleRecord>>()
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].as_slice(), dataset.events()[0].as_slice());
        assert!(rows[1].as_slice().is_empty());
        assert_eq!(rows[2].as_slice()[0].pid, 22.0);

        let num_events: u64 = file.attr("num_events").unwrap().read_scalar().unwrap();
        assert_eq!(num_events, 3);
    }

    #[test]
    fn test_existing_file_is_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.h5");
        std::fs::write(&path, b"stale contents").unwrap();

        write_hdf5(&path, &EventDataset::new(), &OutputMetadata::default()).unwrap();

        let file = hdf5::File::open(&path).unwrap();
        assert_eq!(file.dataset(DATA_DATASET).unwrap().size(), 0);
        assert_eq!(file.dataset(WEIGHTS_DATASET).unwrap().size(), 0);
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("events.h5");

        let err = write_hdf5(&path, &sample_dataset(), &OutputMetadata::default()).unwrap_err();
        assert!(matches!(err, LheError::Io { .. }));
        assert!(!path.exists());
    }
}
