//! AFS archive offset table.
//!
//! The voice archive is an AFS container: a 4-byte magic, a little-endian
//! entry count, then `count` records of `(offset, size)`. Only the table is
//! read here; entry payloads are fetched on demand by byte range so memory
//! stays bounded regardless of container size.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Error, Result};

const AFS_MAGIC: [u8; 4] = *b"AFS\0";
const HEADER_LEN: usize = 8;
const ENTRY_LEN: usize = 8;

/// Upper bound on the entry count; anything larger is a corrupt header.
const MAX_ENTRY_COUNT: u32 = 1_000_000;

/// One sub-file in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AfsEntry {
    pub offset: u32,
    pub size: u32,
}

/// Immutable offset/size table, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AfsIndex {
    entries: Vec<AfsEntry>,
}

impl AfsIndex {
    /// Load the offset table from an archive file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file =
            File::open(path).map_err(|_| Error::ArchiveNotFound(path.to_path_buf()))?;

        let mut header = [0u8; HEADER_LEN];
        let read = read_up_to(&mut file, &mut header)?;
        if read < HEADER_LEN {
            return Err(Error::Truncated {
                expected: HEADER_LEN,
                actual: read,
            });
        }

        let count = Self::parse_header(&header)?;

        let table_len = count as usize * ENTRY_LEN;
        let mut table = vec![0u8; table_len];
        let read = read_up_to(&mut file, &mut table)?;
        if read < table_len {
            return Err(Error::Truncated {
                expected: HEADER_LEN + table_len,
                actual: HEADER_LEN + read,
            });
        }

        Ok(Self::from_table(&table, count))
    }

    /// Parse an index from an in-memory header + table prefix.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(Error::Truncated {
                expected: HEADER_LEN,
                actual: data.len(),
            });
        }

        let count = Self::parse_header(&data[..HEADER_LEN])?;

        let table_len = count as usize * ENTRY_LEN;
        let available = data.len() - HEADER_LEN;
        if available < table_len {
            return Err(Error::Truncated {
                expected: HEADER_LEN + table_len,
                actual: data.len(),
            });
        }

        Ok(Self::from_table(
            &data[HEADER_LEN..HEADER_LEN + table_len],
            count,
        ))
    }

    fn parse_header(header: &[u8]) -> Result<u32> {
        if header[..4] != AFS_MAGIC {
            return Err(Error::InvalidFormat(format!(
                "bad magic: {:02X?}",
                &header[..4]
            )));
        }

        let count = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if count == 0 || count > MAX_ENTRY_COUNT {
            return Err(Error::CorruptHeader(count));
        }

        Ok(count)
    }

    fn from_table(table: &[u8], count: u32) -> Self {
        let mut entries = Vec::with_capacity(count as usize);
        for record in table.chunks_exact(ENTRY_LEN) {
            entries.push(AfsEntry {
                offset: u32::from_le_bytes([record[0], record[1], record[2], record[3]]),
                size: u32::from_le_bytes([record[4], record[5], record[6], record[7]]),
            });
        }
        Self { entries }
    }

    /// Look up an entry by position.
    pub fn entry(&self, index: usize) -> Result<AfsEntry> {
        self.entries
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read one entry's byte range from the archive file.
pub fn read_entry<P: AsRef<Path>>(path: P, entry: AfsEntry) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|_| Error::ArchiveNotFound(path.to_path_buf()))?;

    file.seek(SeekFrom::Start(entry.offset as u64))?;

    let mut block = vec![0u8; entry.size as usize];
    let read = read_up_to(&mut file, &mut block)?;
    if read < block.len() {
        return Err(Error::Truncated {
            expected: entry.size as usize,
            actual: read,
        });
    }

    Ok(block)
}

/// Fill as much of `buf` as the reader provides, returning the byte count.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_archive(entries: &[(u32, u32)]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"AFS\0");
        data.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        for &(offset, size) in entries {
            data.extend_from_slice(&offset.to_le_bytes());
            data.extend_from_slice(&size.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_parse_valid_index() {
        let data = build_archive(&[(0x800, 100), (0x1000, 200), (0x2000, 44)]);
        let index = AfsIndex::parse(&data).unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(
            index.entry(1).unwrap(),
            AfsEntry {
                offset: 0x1000,
                size: 200
            }
        );
    }

    #[test]
    fn test_bad_magic() {
        let mut data = build_archive(&[(0x800, 100)]);
        data[0] = b'X';

        assert!(matches!(
            AfsIndex::parse(&data),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_zero_count() {
        let data = build_archive(&[]);
        assert!(matches!(AfsIndex::parse(&data), Err(Error::CorruptHeader(0))));
    }

    #[test]
    fn test_oversized_count() {
        let mut data = build_archive(&[(0, 0)]);
        data[4..8].copy_from_slice(&2_000_000u32.to_le_bytes());

        assert!(matches!(
            AfsIndex::parse(&data),
            Err(Error::CorruptHeader(2_000_000))
        ));
    }

    #[test]
    fn test_truncated_table() {
        let mut data = build_archive(&[(0x800, 100), (0x1000, 200)]);
        data.truncate(data.len() - 3);

        assert!(matches!(AfsIndex::parse(&data), Err(Error::Truncated { .. })));
    }

    #[test]
    fn test_index_out_of_range() {
        let data = build_archive(&[(0x800, 100)]);
        let index = AfsIndex::parse(&data).unwrap();

        assert!(matches!(
            index.entry(1),
            Err(Error::IndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.afs");
        std::fs::write(&path, build_archive(&[(8, 4), (12, 4)])).unwrap();

        let index = AfsIndex::load(&path).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.afs");

        assert!(matches!(
            AfsIndex::load(&path),
            Err(Error::ArchiveNotFound(_))
        ));
    }

    #[test]
    fn test_read_entry_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.afs");
        let mut data = build_archive(&[(16, 4)]);
        data.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);
        std::fs::write(&path, data).unwrap();

        let block = read_entry(&path, AfsEntry { offset: 16, size: 4 }).unwrap();
        assert_eq!(block, vec![0xAA, 0xBB, 0xCC, 0xDD]);
    }

    #[test]
    fn test_read_entry_past_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.afs");
        std::fs::write(&path, build_archive(&[(8, 64)])).unwrap();

        assert!(matches!(
            read_entry(&path, AfsEntry { offset: 8, size: 64 }),
            Err(Error::Truncated { .. })
        ));
    }
}
