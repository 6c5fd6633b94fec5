//! CRC32C (Castagnoli) payload verification

use tracing::debug;

use crate::error::{ChecksumDisplay, CredsError, Result};

/// Compute the CRC32C checksum of `data`
pub fn crc32c(data: &[u8]) -> u32 {
    ::crc32c::crc32c(data)
}

/// Verify `data` against the checksum reported by the secret provider.
///
/// A missing provider checksum is treated as a mismatch: the payload cannot
/// be trusted without one.
pub fn verify_crc32c(data: &[u8], expected: Option<u32>) -> Result<()> {
    let actual = crc32c(data);

    match expected {
        Some(expected) if expected == actual => {
            debug!("Payload checksum verified: {:#010x}", actual);
            Ok(())
        }
        _ => Err(CredsError::ChecksumMismatch {
            expected: ChecksumDisplay(expected),
            actual,
        }),
    }
}
