//! Binary format sniffing.
//!
//! Infers a file's actual format from its leading bytes, independently
//! of the declared extension. The mismatch between the two is one of the
//! scanner's strongest signals.

use crate::core::types::SniffedFormat;
use crate::signatures::file::{
    GZIP_SIGNATURE, MZ_SIGNATURE, OLE_SIGNATURE, RAR_SIGNATURE, SEVEN_ZIP_SIGNATURE,
    ZIP_SIGNATURES,
};

/// Sniffs the format of `data` from its magic bytes.
pub fn sniff_format(data: &[u8]) -> SniffedFormat {
    if data.starts_with(MZ_SIGNATURE) {
        return SniffedFormat::WindowsExecutable;
    }
    if ZIP_SIGNATURES.iter().any(|sig| data.starts_with(sig)) {
        return SniffedFormat::ZipArchive;
    }
    if data.starts_with(&OLE_SIGNATURE) {
        return SniffedFormat::OleCompound;
    }
    if data.starts_with(RAR_SIGNATURE) {
        return SniffedFormat::RarArchive;
    }
    if data.starts_with(&SEVEN_ZIP_SIGNATURE) {
        return SniffedFormat::SevenZipArchive;
    }
    if data.starts_with(&GZIP_SIGNATURE) {
        return SniffedFormat::GzipArchive;
    }
    SniffedFormat::Unknown
}

/// Returns `true` when the content matches the container format implied
/// by an archive extension.
pub fn matches_archive_extension(ext: &str, data: &[u8]) -> bool {
    match ext {
        "zip" => ZIP_SIGNATURES.iter().any(|sig| data.starts_with(sig)),
        "rar" => data.starts_with(RAR_SIGNATURE),
        "7z" => data.starts_with(&SEVEN_ZIP_SIGNATURE),
        "gz" => data.starts_with(&GZIP_SIGNATURE),
        // Tar has no leading magic; the ustar marker sits at offset 257.
        "tar" => data.len() > 262 && &data[257..262] == b"ustar",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(sniff_format(b"MZ\x90\x00"), SniffedFormat::WindowsExecutable);
        assert_eq!(sniff_format(b"PK\x03\x04rest"), SniffedFormat::ZipArchive);
        assert_eq!(
            sniff_format(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0x00]),
            SniffedFormat::OleCompound
        );
        assert_eq!(sniff_format(b"Rar!\x1a\x07\x00"), SniffedFormat::RarArchive);
        assert_eq!(
            sniff_format(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]),
            SniffedFormat::SevenZipArchive
        );
        assert_eq!(sniff_format(&[0x1F, 0x8B, 0x08]), SniffedFormat::GzipArchive);
        assert_eq!(sniff_format(b"plain text"), SniffedFormat::Unknown);
        assert_eq!(sniff_format(b""), SniffedFormat::Unknown);
    }

    #[test]
    fn test_archive_extension_validation() {
        assert!(matches_archive_extension("zip", b"PK\x03\x04"));
        assert!(!matches_archive_extension("zip", b"MZ\x90"));
        assert!(matches_archive_extension("rar", b"Rar!\x1a\x07\x01"));
        assert!(!matches_archive_extension("rar", b"PK\x03\x04"));
        assert!(matches_archive_extension("gz", &[0x1F, 0x8B, 0x08]));

        let mut tar = vec![0u8; 512];
        tar[257..262].copy_from_slice(b"ustar");
        assert!(matches_archive_extension("tar", &tar));
        assert!(!matches_archive_extension("tar", &[0u8; 100]));
    }
}
