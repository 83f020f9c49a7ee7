//! Bytecode container format gate
//!
//! A container starts with a big-endian magic value and a big-endian format
//! version. Loaders must run [`check_format`] (or [`ContainerHeader::read`])
//! before trusting any decoded byte stream.

use tracing::{debug, warn};

use super::error::LoadError;

/// Magic value of bytecode containers ('DBC2')
pub const MAGIC: u32 = 0x4442_4332;

/// Oldest supported bytecode format version
pub const MIN_SUPPORTED_VERSION: u32 = 3;

/// Newest supported bytecode format version
pub const MAX_SUPPORTED_VERSION: u32 = 9;

/// Size of the magic and version fields
pub const HEADER_SIZE: usize = 8;

/// Check if a format version lies in the supported range
#[inline]
pub const fn is_supported_version(version: u32) -> bool {
    version >= MIN_SUPPORTED_VERSION && version <= MAX_SUPPORTED_VERSION
}

/// Validate a magic value and format version pair
pub fn check_format(magic: u32, version: u32) -> Result<(), LoadError> {
    if magic != MAGIC {
        return Err(LoadError::BadMagic { found: magic });
    }
    if !is_supported_version(version) {
        return Err(LoadError::UnsupportedVersion {
            version,
            min: MIN_SUPPORTED_VERSION,
            max: MAX_SUPPORTED_VERSION,
        });
    }
    Ok(())
}

/// Validated front of a bytecode container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub magic: u32,
    pub version: u32,
}

impl ContainerHeader {
    /// Read and validate the header at the front of `bytes`
    pub fn read(bytes: &[u8]) -> Result<Self, LoadError> {
        let (magic, version) = match bytes {
            [m0, m1, m2, m3, v0, v1, v2, v3, ..] => (
                u32::from_be_bytes([*m0, *m1, *m2, *m3]),
                u32::from_be_bytes([*v0, *v1, *v2, *v3]),
            ),
            _ => {
                warn!(
                    target: "kbc::header",
                    len = bytes.len(),
                    "Container shorter than its header"
                );
                return Err(LoadError::TruncatedHeader { len: bytes.len() });
            }
        };

        if let Err(err) = check_format(magic, version) {
            warn!(
                target: "kbc::header",
                magic,
                version,
                "Rejected container: {}",
                err
            );
            return Err(err);
        }

        debug!(target: "kbc::header", version, "Accepted bytecode container");
        Ok(Self { magic, version })
    }

    /// Bytes following the header
    pub fn payload(bytes: &[u8]) -> &[u8] {
        bytes.get(HEADER_SIZE..).unwrap_or(&[])
    }
}
