// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk image framing
//!
//! Layout: 4-byte magic, CRC32 of the payload (little endian), payload.

use thiserror::Error;

pub(crate) const MAGIC: &[u8; 4] = b"CKS1";
const HEADER_LEN: usize = MAGIC.len() + 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("image truncated: {0} bytes")]
    Truncated(usize),
    #[error("bad magic")]
    BadMagic,
    #[error("checksum mismatch: expected {expected:08x}, found {found:08x}")]
    Checksum { expected: u32, found: u32 },
}

/// Prefix `payload` with the frame header
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Verify the header and return the payload
pub fn decode(bytes: &[u8]) -> Result<&[u8], FrameError> {
    if bytes.len() < HEADER_LEN {
        return Err(FrameError::Truncated(bytes.len()));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    if &header[..MAGIC.len()] != MAGIC {
        return Err(FrameError::BadMagic);
    }
    let mut crc = [0u8; 4];
    crc.copy_from_slice(&header[MAGIC.len()..]);
    let expected = u32::from_le_bytes(crc);
    let found = crc32fast::hash(payload);
    if expected != found {
        return Err(FrameError::Checksum { expected, found });
    }
    Ok(payload)
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
