//! Binary format for encoder files.
//!
//! ## Format Layout
//!
//! ```text
//! +------------------+
//! | Header (16 bytes)|
//! +------------------+
//! | Snapshot         |
//! | (bincode)        |
//! +------------------+
//! ```
//!
//! ### Header (16 bytes)
//! - Magic number (4 bytes): "VTXE"
//! - Version (2 bytes, little endian)
//! - Encoder kind (1 byte): 1 = BoW, 2 = BoNG, 3 = PV, 4 = LDA
//! - Flags (1 byte): bit 0 = fitted
//! - Reserved (8 bytes)

use crate::encoder::{EncoderKind, EncoderSnapshot};
use crate::error::{EncoderError, Result};
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic number for encoder files.
const MAGIC: &[u8; 4] = b"VTXE";

/// Current format version.
const VERSION: u16 = 1;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 16;

/// Flag indicating the snapshot carries fitted state.
const FLAG_FITTED: u8 = 0x01;

/// Encoder file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderHeader {
    /// Format version.
    pub version: u16,
    /// Encoder variant of the payload.
    pub kind: EncoderKind,
    /// Flags.
    pub flags: u8,
}

impl EncoderHeader {
    /// Creates the header for a snapshot.
    pub fn for_snapshot(snapshot: &EncoderSnapshot) -> Self {
        Self {
            version: VERSION,
            kind: snapshot.kind(),
            flags: if snapshot.is_fitted() { FLAG_FITTED } else { 0 },
        }
    }

    /// Returns true if the payload carries fitted state.
    pub fn is_fitted(&self) -> bool {
        self.flags & FLAG_FITTED != 0
    }

    /// Writes the header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(MAGIC);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6] = self.kind.to_byte();
        bytes[7] = self.flags;
        // Reserved (bytes 8-15)
        bytes
    }

    /// Reads a header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(EncoderError::InvalidModelFormat(
                "Header too short".to_string(),
            ));
        }

        if &bytes[0..4] != MAGIC {
            return Err(EncoderError::InvalidModelFormat(
                "Invalid magic number".to_string(),
            ));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(EncoderError::InvalidModelFormat(format!(
                "Unsupported format version {version} (expected {VERSION})"
            )));
        }

        let kind = EncoderKind::from_byte(bytes[6]).ok_or_else(|| {
            EncoderError::InvalidModelFormat(format!("Unknown encoder kind {}", bytes[6]))
        })?;

        Ok(Self {
            version,
            kind,
            flags: bytes[7],
        })
    }
}

/// Reader/writer for encoder files.
pub struct EncoderFile;

impl EncoderFile {
    /// Writes a snapshot to `path`.
    pub fn write<P: AsRef<Path>>(path: P, snapshot: &EncoderSnapshot) -> Result<()> {
        let path = path.as_ref();
        let header = EncoderHeader::for_snapshot(snapshot);

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&header.to_bytes())?;
        bincode::serialize_into(&mut writer, snapshot)?;
        writer.flush()?;

        info!(
            "Saved {} encoder ({}) to {:?}",
            header.kind,
            if header.is_fitted() { "fitted" } else { "unfitted" },
            path
        );
        Ok(())
    }

    /// Reads a snapshot from `path`, checking it against the header.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<EncoderSnapshot> {
        let (header, snapshot) = Self::read_with_header(path)?;
        if snapshot.is_fitted() != header.is_fitted() {
            return Err(EncoderError::InvalidModelFormat(
                "Header fitted flag does not match payload".to_string(),
            ));
        }
        Ok(snapshot)
    }

    /// Reads the header and snapshot from `path`.
    pub fn read_with_header<P: AsRef<Path>>(path: P) -> Result<(EncoderHeader, EncoderSnapshot)> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut header_bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_bytes).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                EncoderError::InvalidModelFormat("Header too short".to_string())
            } else {
                EncoderError::Io(e)
            }
        })?;
        let header = EncoderHeader::from_bytes(&header_bytes)?;

        let snapshot: EncoderSnapshot = bincode::deserialize_from(&mut reader)
            .map_err(|e| EncoderError::InvalidModelFormat(format!("Corrupt payload: {e}")))?;

        if snapshot.kind() != header.kind {
            return Err(EncoderError::InvalidModelFormat(format!(
                "Header declares a {} encoder but the payload holds {}",
                header.kind,
                snapshot.kind()
            )));
        }

        Ok((header, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BowConfig, LdaConfig};
    use tempfile::tempdir;

    fn bow_snapshot() -> EncoderSnapshot {
        EncoderSnapshot::Bow {
            config: BowConfig::default(),
            vectorizer: None,
        }
    }

    #[test]
    fn test_header_roundtrip() {
        let header = EncoderHeader {
            version: VERSION,
            kind: EncoderKind::Pv,
            flags: FLAG_FITTED,
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"VTXE");
        assert_eq!(EncoderHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = EncoderHeader::for_snapshot(&bow_snapshot()).to_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            EncoderHeader::from_bytes(&bytes),
            Err(EncoderError::InvalidModelFormat(_))
        ));
    }

    #[test]
    fn test_bad_version_and_kind() {
        let mut bytes = EncoderHeader::for_snapshot(&bow_snapshot()).to_bytes();
        bytes[4] = 99;
        assert!(EncoderHeader::from_bytes(&bytes).is_err());

        let mut bytes = EncoderHeader::for_snapshot(&bow_snapshot()).to_bytes();
        bytes[6] = 42;
        assert!(EncoderHeader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bow.vtxe");
        EncoderFile::write(&path, &bow_snapshot()).unwrap();

        let (header, snapshot) = EncoderFile::read_with_header(&path).unwrap();
        assert_eq!(header.kind, EncoderKind::Bow);
        assert!(!header.is_fitted());
        assert_eq!(snapshot, bow_snapshot());
    }

    #[test]
    fn test_kind_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lda.vtxe");
        let snapshot = EncoderSnapshot::Lda {
            config: LdaConfig::default(),
            fitted: None,
        };
        EncoderFile::write(&path, &snapshot).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes[6] = EncoderKind::Bow.to_byte();
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            EncoderFile::read(&path),
            Err(EncoderError::InvalidModelFormat(_))
        ));
    }

    #[test]
    fn test_truncated_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.vtxe");
        std::fs::write(&path, b"VTX").unwrap();
        assert!(matches!(
            EncoderFile::read(&path),
            Err(EncoderError::InvalidModelFormat(_))
        ));
    }
}
