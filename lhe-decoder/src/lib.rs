//! LHE Decoder Library
//!
//! Converts Les Houches Event (LHE) files, plain or gzip-compressed, into a
//! single HDF5 file with one particle table and one weight per event.
//!
//! # Architecture
//!
//! This library is a straight pipeline with no shared state:
//! - Discovers `.lhe` / `.lhe.gz` files below a directory (stable order)
//! - Parses each `<event>` block: weight + final-state particles
//! - Derives transverse momentum and rapidity per particle
//! - Concatenates all files and writes `data` + `weights` datasets
//!
//! Command-line handling, config files and reporting live in the
//! application layer (lhe-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use lhe_decoder::{parse_document, ConvertConfig, Converter};
//! use std::path::Path;
//!
//! // Parse a single document held in memory
//! let text = std::fs::read_to_string("run_01.lhe").unwrap();
//! let dataset = parse_document(&text).unwrap();
//! for (particles, weight) in dataset.iter() {
//!     println!("{} final-state particles, weight {}", particles.len(), weight);
//! }
//!
//! // Or convert a whole directory tree
//! let converter = Converter::new(ConvertConfig::new().with_progress(false));
//! converter
//!     .convert(Path::new("LHE_dir"), Path::new("output.h5"))
//!     .unwrap();
//! ```

// Public modules
pub mod config;
pub mod converter;
pub mod parser;
pub mod types;
pub mod writer;

// Re-export main types for convenience
pub use config::ConvertConfig;
pub use converter::Converter;
pub use input::read_lhe_text;
pub use parser::{parse_document, parse_event_text, parse_particle_line, EventReader};
pub use types::{
    rapidity, transverse_momentum, ConversionSummary, Event, EventDataset, FileSummary,
    LheError, ParseError, ParticleRecord, Result, Timestamp,
};
pub use writer::{write_hdf5, OutputMetadata, DATA_DATASET, WEIGHTS_DATASET};

// Internal modules (not exposed in public API)
mod input;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
