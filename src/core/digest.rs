//! Content digest computation.
//!
//! Every scanned payload is identified by a fixed set of three digests
//! (MD5, SHA1, SHA256). All three are computed in a single pass over the
//! data so large payloads are only traversed once.

use crate::core::types::DigestSet;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Computes the fixed digest set over byte content.
///
/// # Examples
///
/// ```rust
/// use vetkit::core::ContentDigester;
///
/// let digester = ContentDigester::new();
/// let digests = digester.digest_bytes(b"hello");
/// assert_eq!(digests.md5, "5d41402abc4b2a76b9719d911017c592");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentDigester;

impl ContentDigester {
    /// Creates a new digester.
    pub fn new() -> Self {
        Self
    }

    /// Computes all three digests over in-memory bytes.
    pub fn digest_bytes(&self, data: &[u8]) -> DigestSet {
        let mut md5 = Md5::new();
        let mut sha1 = Sha1::new();
        let mut sha256 = Sha256::new();

        md5.update(data);
        sha1.update(data);
        sha256.update(data);

        DigestSet {
            md5: hex::encode(md5.finalize()),
            sha1: hex::encode(sha1.finalize()),
            sha256: hex::encode(sha256.finalize()),
        }
    }

    /// Computes all three digests by streaming from a reader.
    ///
    /// Data is read in 64 KB chunks and fed to all three hashers in a
    /// single pass.
    pub fn digest_reader<R: Read>(&self, reader: &mut R) -> std::io::Result<DigestSet> {
        let mut md5 = Md5::new();
        let mut sha1 = Sha1::new();
        let mut sha256 = Sha256::new();

        let mut buffer = [0u8; 64 * 1024];
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            let chunk = &buffer[..bytes_read];
            md5.update(chunk);
            sha1.update(chunk);
            sha256.update(chunk);
        }

        Ok(DigestSet {
            md5: hex::encode(md5.finalize()),
            sha1: hex::encode(sha1.finalize()),
            sha256: hex::encode(sha256.finalize()),
        })
    }

    /// Computes all three digests over a file on disk.
    pub fn digest_file(&self, path: &Path) -> std::io::Result<DigestSet> {
        let file = std::fs::File::open(path)?;
        let mut reader = std::io::BufReader::new(file);
        self.digest_reader(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        let digester = ContentDigester::new();
        let digests = digester.digest_bytes(b"abc");

        assert_eq!(digests.md5, "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(digests.sha1, "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(
            digests.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_reader_matches_bytes() {
        let digester = ContentDigester::new();
        let data = vec![0x42u8; 200_000];

        let from_bytes = digester.digest_bytes(&data);
        let from_reader = digester
            .digest_reader(&mut std::io::Cursor::new(&data))
            .unwrap();

        assert_eq!(from_bytes, from_reader);
    }

    #[test]
    fn test_digests_are_deterministic() {
        let digester = ContentDigester::new();
        assert_eq!(digester.digest_bytes(b"same"), digester.digest_bytes(b"same"));
        assert_ne!(
            digester.digest_bytes(b"same").sha256,
            digester.digest_bytes(b"different").sha256
        );
    }
}
