//! Core types for the LHE decoder library
//!
//! This module defines the records the parser emits, the event collection the
//! aggregator builds, and the error types shared by every stage of a conversion.

use chrono::{DateTime, Utc};
use hdf5::H5Type;
use serde::Serialize;
use std::path::PathBuf;

/// Timestamp type used in conversion summaries
pub type Timestamp = DateTime<Utc>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, LheError>;

/// A final-state particle with its derived kinematics
///
/// Every member is stored as `f64`, including the integer-valued `pid` and
/// `status` codes, so the record maps onto a homogeneous HDF5 compound type.
/// Member order is the on-disk column order.
#[derive(Debug, Clone, Copy, PartialEq, H5Type)]
#[repr(C)]
pub struct ParticleRecord {
    /// PDG particle code
    pub pid: f64,
    /// Generator status code (always 1 for retained particles)
    pub status: f64,
    /// Momentum x component in GeV
    pub px: f64,
    /// Momentum y component in GeV
    pub py: f64,
    /// Momentum z (beam axis) component in GeV
    pub pz: f64,
    /// Transverse momentum, sqrt(px² + py²)
    pub pt: f64,
    /// Energy in GeV
    #[hdf5(rename = "E")]
    pub e: f64,
    /// Mass in GeV
    pub m: f64,
    /// Rapidity, 0.5·ln((E + pz) / (E − pz))
    pub y: f64,
}

impl ParticleRecord {
    /// Build a record from raw momentum components, deriving `pt` and `y`
    ///
    /// Rapidity is left to IEEE arithmetic: `+inf` when E == pz, `-inf` when
    /// E == -pz and NaN when both vanish or the ratio is negative.
    pub fn from_momentum(pid: f64, status: f64, px: f64, py: f64, pz: f64, e: f64, m: f64) -> Self {
        Self {
            pid,
            status,
            px,
            py,
            pz,
            pt: transverse_momentum(px, py),
            e,
            m,
            y: rapidity(e, pz),
        }
    }

    /// True for final-state particles
    pub fn is_final_state(&self) -> bool {
        self.status == crate::parser::FINAL_STATE
    }
}

/// Transverse momentum from the momentum components perpendicular to the beam
pub fn transverse_momentum(px: f64, py: f64) -> f64 {
    (px * px + py * py).sqrt()
}

/// Rapidity along the beam axis
pub fn rapidity(e: f64, pz: f64) -> f64 {
    0.5 * ((e + pz) / (e - pz)).ln()
}

/// One collision event: its weight and the final-state particles in source order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    /// Event weight (third token of the event metadata line)
    pub weight: f64,
    /// Retained (status == 1) particles
    pub particles: Vec<ParticleRecord>,
}

/// Events and their weights as two index-aligned columns
///
/// The only way to grow a dataset is to push an event together with its
/// weight (or to append another dataset), so `events.len() == weights.len()`
/// always holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventDataset {
    events: Vec<Vec<ParticleRecord>>,
    weights: Vec<f64>,
}

impl EventDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event at the end
    pub fn push(&mut self, event: Event) {
        self.events.push(event.particles);
        self.weights.push(event.weight);
    }

    /// Append every event of `other`, keeping the event/weight pairing
    pub fn extend(&mut self, other: EventDataset) {
        self.events.extend(other.events);
        self.weights.extend(other.weights);
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Per-event particle lists
    pub fn events(&self) -> &[Vec<ParticleRecord>] {
        &self.events
    }

    /// Per-event weights
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Total number of retained particles over all events
    pub fn num_particles(&self) -> usize {
        self.events.iter().map(Vec::len).sum()
    }

    /// Iterate over `(particles, weight)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&[ParticleRecord], f64)> + '_ {
        self.events
            .iter()
            .zip(self.weights.iter())
            .map(|(particles, weight)| (particles.as_slice(), *weight))
    }
}

impl FromIterator<Event> for EventDataset {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        let mut dataset = EventDataset::new();
        for event in iter {
            dataset.push(event);
        }
        dataset
    }
}

/// Per-file line of a conversion summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub events: usize,
    pub particles: usize,
}

/// What a finished conversion produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionSummary {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    pub files: Vec<FileSummary>,
    pub total_events: usize,
    pub total_particles: usize,
    pub converted_at: Timestamp,
}

/// Errors raised while reading the text of a single LHE document
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed XML at byte {position}: {message}")]
    MalformedXml { position: u64, message: String },

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Event {event}: metadata line has {found} tokens, expected at least 3")]
    MetadataTooShort { event: usize, found: usize },

    /// `line` counts within the trimmed event body, the metadata line being 1
    #[error("Event {event}, line {line} within event: particle line has {found} fields, expected 13")]
    FieldCount { event: usize, line: usize, found: usize },

    #[error("Event {event}, line {line} within event: invalid number {token:?}")]
    InvalidNumber {
        event: usize,
        line: usize,
        token: String,
    },
}

impl ParseError {
    /// Attach an event index to an error raised while parsing a detached event body
    pub(crate) fn in_event(self, index: usize) -> Self {
        match self {
            ParseError::MetadataTooShort { found, .. } => {
                ParseError::MetadataTooShort { event: index, found }
            }
            ParseError::FieldCount { line, found, .. } => ParseError::FieldCount {
                event: index,
                line,
                found,
            },
            ParseError::InvalidNumber { line, token, .. } => ParseError::InvalidNumber {
                event: index,
                line,
                token,
            },
            other => other,
        }
    }
}

/// Errors that can occur during a conversion
#[derive(Debug, thiserror::Error)]
pub enum LheError {
    #[error("Invalid LHE input {path:?}: {source}")]
    InputFormat {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write HDF5 output {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: hdf5::Error,
    },
}

impl LheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LheError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: hdf5::Error) -> Self {
        LheError::Output {
            path: path.into(),
            source,
        }
    }
}
