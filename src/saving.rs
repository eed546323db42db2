use bincode::{deserialize_from, serialize_into};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// Every stored hash, keyed by store key (`student:<id>`)
pub type Snapshot = HashMap<String, HashMap<String, String>>;

/// Write a snapshot of the store as gzip-compressed bincode
///
/// The data is written to a sibling temporary file first and renamed over
/// `path`, so a crash mid-write leaves the previous snapshot intact.
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path)?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut writer = std::io::BufWriter::new(encoder);

        serialize_into(&mut writer, snapshot)?;
        writer.flush()?;
        let encoder = writer.into_inner().map_err(|e| e.into_error())?;
        encoder.finish()?;
    }
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Read a snapshot written by [`save_snapshot`]
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut reader = std::io::BufReader::new(decoder);

    let snapshot: Snapshot = deserialize_from(&mut reader)?;

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_survives_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.bin.gz");

        let mut hash = HashMap::new();
        hash.insert("name".to_string(), "Ana".to_string());
        hash.insert("course".to_string(), "Math".to_string());
        let mut snapshot = Snapshot::new();
        snapshot.insert("student:1".to_string(), hash);

        save_snapshot(&snapshot, &path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn loading_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.bin.gz");
        std::fs::write(&path, b"not a snapshot").unwrap();

        assert!(load_snapshot(&path).is_err());
    }
}
