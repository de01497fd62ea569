//! Store snapshot format
//!
//! The whole store persists as one binary snapshot:
//!
//! ```text
//! magic (4) | version (2, LE) | payload len (8, LE) | payload (bincode) | crc32 (4, LE)
//! ```
//!
//! The CRC covers everything before it. Writes go through a temp file and an
//! atomic rename so a crash never leaves a partially written snapshot behind.

use inkstone_core::error::{Error, Result};
use inkstone_core::types::{IndexedDocument, Posting};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// File magic for inkstone snapshots
const MAGIC: [u8; 4] = *b"INKS";
/// Current snapshot format version
const VERSION: u16 = 1;

/// Serialized form of the store tables
///
/// The doc-to-terms reverse map is derivable and rebuilt on load.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Document metadata records, keyed by document id
    pub metadata: BTreeMap<String, IndexedDocument>,
    /// Posting lists: term -> document id -> posting
    pub postings: BTreeMap<String, BTreeMap<String, Posting>>,
}

/// Write a snapshot atomically, returning the final file size in bytes
pub fn write_atomic(path: &Path, snapshot: &StoreSnapshot) -> Result<u64> {
    let temp_path = path.with_extension("snap.tmp");

    // Stale temp file from a previous failed attempt
    if temp_path.exists() {
        warn!(path = %temp_path.display(), "Removing stale temp file");
        let _ = std::fs::remove_file(&temp_path);
    }

    match write_snapshot(&temp_path, snapshot) {
        Ok(size) => match std::fs::rename(&temp_path, path) {
            Ok(()) => {
                debug!(path = %path.display(), size_bytes = size, "Snapshot written");
                Ok(size)
            }
            Err(e) => {
                warn!(
                    temp_path = %temp_path.display(),
                    error = %e,
                    "Rename failed, cleaning up temp file"
                );
                let _ = std::fs::remove_file(&temp_path);
                Err(Error::Io(e))
            }
        },
        Err(e) => {
            let _ = std::fs::remove_file(&temp_path);
            Err(e)
        }
    }
}

fn write_snapshot(path: &Path, snapshot: &StoreSnapshot) -> Result<u64> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let payload = bincode::serialize(snapshot)?;

    let mut hasher = crc32fast::Hasher::new();
    let mut file = File::create(path)?;

    file.write_all(&MAGIC)?;
    hasher.update(&MAGIC);

    let version_bytes = VERSION.to_le_bytes();
    file.write_all(&version_bytes)?;
    hasher.update(&version_bytes);

    let len_bytes = (payload.len() as u64).to_le_bytes();
    file.write_all(&len_bytes)?;
    hasher.update(&len_bytes);

    file.write_all(&payload)?;
    hasher.update(&payload);

    let checksum = hasher.finalize();
    file.write_all(&checksum.to_le_bytes())?;

    file.sync_all()?;

    Ok(std::fs::metadata(path)?.len())
}

/// Read and verify a snapshot
///
/// Checksum or format failures surface as [`Error::Corruption`].
pub fn read(path: &Path) -> Result<StoreSnapshot> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;

    // magic + version + len + crc is the minimum possible file
    if bytes.len() < 4 + 2 + 8 + 4 {
        return Err(Error::Corruption(format!(
            "snapshot too short: {} bytes",
            bytes.len()
        )));
    }

    if bytes[0..4] != MAGIC {
        return Err(Error::Corruption("bad snapshot magic".to_string()));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(Error::Corruption(format!(
            "unsupported snapshot version {version}"
        )));
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&bytes[6..14]);
    let payload_len = u64::from_le_bytes(len_bytes) as usize;

    let payload_end = 14 + payload_len;
    if bytes.len() != payload_end + 4 {
        return Err(Error::Corruption(format!(
            "snapshot length mismatch: header says {} payload bytes, file has {}",
            payload_len,
            bytes.len().saturating_sub(14 + 4)
        )));
    }

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&bytes[..payload_end]);
    let expected = hasher.finalize();

    let mut crc_bytes = [0u8; 4];
    crc_bytes.copy_from_slice(&bytes[payload_end..]);
    let stored = u32::from_le_bytes(crc_bytes);

    if expected != stored {
        return Err(Error::Corruption(format!(
            "CRC mismatch: expected {expected:#010x}, found {stored:#010x}"
        )));
    }

    let snapshot: StoreSnapshot = bincode::deserialize(&bytes[14..payload_end])
        .map_err(|e| Error::Corruption(format!("snapshot decode failed: {e}")))?;

    Ok(snapshot)
}
