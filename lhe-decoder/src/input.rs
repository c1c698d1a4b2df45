//! Reading LHE input files from disk
//!
//! Plain files are read as UTF-8 text; gzip-compressed files are
//! decompressed on the fly. The file handle never outlives the call.

use crate::config::ConvertConfig;
use crate::types::{LheError, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Read the full text of an LHE file, decompressing it when its name carries
/// the configured gzip suffix
pub fn read_lhe_text(path: &Path, config: &ConvertConfig) -> Result<String> {
    let file = File::open(path).map_err(|e| LheError::io(path, e))?;

    let compressed = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|name| config.is_compressed(name))
        .unwrap_or(false);

    let mut text = String::new();
    if compressed {
        log::debug!("Decompressing gzip input: {:?}", path);
        // Generators occasionally emit concatenated gzip members
        MultiGzDecoder::new(BufReader::new(file))
            .read_to_string(&mut text)
            .map_err(|e| LheError::io(path, e))?;
    } else {
        BufReader::new(file)
            .read_to_string(&mut text)
            .map_err(|e| LheError::io(path, e))?;
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_plain_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.lhe");
        std::fs::write(&path, "<LesHouchesEvents></LesHouchesEvents>").unwrap();

        let text = read_lhe_text(&path, &ConvertConfig::default()).unwrap();
        assert_eq!(text, "<LesHouchesEvents></LesHouchesEvents>");
    }

    #[test]
    fn test_read_gzip_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("packed.lhe.gz");

        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"<LesHouchesEvents>gz</LesHouchesEvents>").unwrap();
        encoder.finish().unwrap();

        let text = read_lhe_text(&path, &ConvertConfig::default()).unwrap();
        assert_eq!(text, "<LesHouchesEvents>gz</LesHouchesEvents>");
    }

    #[test]
    fn test_corrupt_gzip_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.lhe.gz");
        std::fs::write(&path, b"definitely not gzip").unwrap();

        let err = read_lhe_text(&path, &ConvertConfig::default()).unwrap_err();
        assert!(matches!(err, LheError::Io { .. }));
    }

    #[test]
    fn test_non_utf8_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.lhe");
        std::fs::write(&path, b"<L>\xff\xfe</L>").unwrap();

        match read_lhe_text(&path, &ConvertConfig::default()).unwrap_err() {
            LheError::Io { path: reported, source } => {
                assert_eq!(reported, path);
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_lhe_text(Path::new("does/not/exist.lhe"), &ConvertConfig::default())
            .unwrap_err();
        match err {
            LheError::Io { path, .. } => assert_eq!(path, Path::new("does/not/exist.lhe")),
            other => panic!("unexpected error: {}", other),
        }
    }
}
