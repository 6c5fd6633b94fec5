//! Secret payload as returned by a backend

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Raw secret bytes plus the provider's CRC32C - zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretPayload {
    data: Vec<u8>,
    #[zeroize(skip)]
    data_crc32c: Option<u32>,
}

impl SecretPayload {
    /// Create a payload from bytes and the checksum reported alongside them
    pub fn new(data: Vec<u8>, data_crc32c: Option<u32>) -> Self {
        Self { data, data_crc32c }
    }

    /// Create a payload with a checksum computed over `data`
    pub fn with_computed_checksum(data: Vec<u8>) -> Self {
        let checksum = crate::checksum::crc32c(&data);
        Self::new(data, Some(checksum))
    }

    /// Get the payload bytes (use carefully)
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Checksum reported by the provider
    pub fn data_crc32c(&self) -> Option<u32> {
        self.data_crc32c
    }
}

impl Clone for SecretPayload {
    fn clone(&self) -> Self {
        Self::new(self.data.clone(), self.data_crc32c)
    }
}

impl std::fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretPayload")
            .field("data", &"[REDACTED]")
            .field("len", &self.data.len())
            .field("data_crc32c", &self.data_crc32c)
            .finish()
    }
}
