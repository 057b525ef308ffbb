// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! DNS wire-format name codec.
//!
//! Names inside ENSIP-10 `resolve(bytes,bytes)` calls are DNS-encoded: each
//! label is prefixed by its length byte and the sequence is terminated by a
//! zero-length label.
//!
//! ```text
//! "alice.telepay.cc" -> 05 'alice' 07 'telepay' 02 'cc' 00
//! ```

/// Maximum length of a single DNS label.
pub const MAX_LABEL_LEN: usize = 63;

/// Errors produced while encoding or decoding DNS wire names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DnsNameError {
    #[error("label at offset {offset} declares {declared} bytes but only {available} remain")]
    Truncated {
        offset: usize,
        declared: usize,
        available: usize,
    },

    #[error("label at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    #[error("empty label in name")]
    EmptyLabel,

    #[error("label `{0}` exceeds {MAX_LABEL_LEN} bytes")]
    LabelTooLong(String),
}

/// Decode a DNS wire-format name into its dotted form.
///
/// Stops at the first zero-length label or at the end of the buffer,
/// whichever comes first.
pub fn decode(data: &[u8]) -> Result<String, DnsNameError> {
    let mut labels = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let len = data[offset] as usize;
        if len == 0 {
            break;
        }

        let start = offset + 1;
        let available = data.len() - start;
        if len > available {
            return Err(DnsNameError::Truncated {
                offset,
                declared: len,
                available,
            });
        }

        let label = std::str::from_utf8(&data[start..start + len])
            .map_err(|_| DnsNameError::InvalidUtf8 { offset })?;
        labels.push(label);
        offset = start + len;
    }

    Ok(labels.join("."))
}

/// Encode a dotted name into DNS wire format.
///
/// The empty string encodes to the root name (a single zero byte).
pub fn encode(name: &str) -> Result<Vec<u8>, DnsNameError> {
    let mut out = Vec::with_capacity(name.len() + 2);

    if !name.is_empty() {
        for label in name.split('.') {
            if label.is_empty() {
                return Err(DnsNameError::EmptyLabel);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DnsNameError::LabelTooLong(label.to_string()));
            }
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
    }

    out.push(0);
    Ok(out)
}
