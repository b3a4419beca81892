//! Text-safe payload decoding.
//!
//! Uploads arrive as base64 text inside a JSON string. Clients differ in
//! what they send, so decoding accepts:
//! - the standard alphabet with or without `=` padding
//! - line-wrapped input (ASCII whitespace is ignored)
//! - a leading `data:<mime>;base64,` prefix

use std::borrow::Cow;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

use crate::{FiledropError, Result};

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Strip a `data:...;base64,` prefix if present.
fn strip_data_url(encoded: &str) -> &str {
    if let Some(rest) = encoded.strip_prefix("data:") {
        if let Some((header, body)) = rest.split_once(',') {
            if header.ends_with(";base64") {
                return body;
            }
        }
    }
    encoded
}

/// Return the payload without whitespace, borrowing when there is none.
fn normalize(encoded: &str) -> Cow<'_, str> {
    let encoded = strip_data_url(encoded.trim());
    if encoded.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(
            encoded
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect(),
        )
    } else {
        Cow::Borrowed(encoded)
    }
}

/// Upper bound on the number of bytes `encoded` decodes to.
///
/// Whitespace is not counted since decoding skips it. Cheap enough to run
/// before decoding so oversized payloads are rejected without allocating.
pub fn decoded_len_estimate(encoded: &str) -> u64 {
    let len = strip_data_url(encoded.trim())
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .count() as u64;
    len.div_ceil(4) * 3
}

/// Number of base64 characters needed to carry `decoded` bytes, padded.
pub fn encoded_len(decoded: u64) -> u64 {
    decoded.div_ceil(3).saturating_mul(4)
}

/// Decode a base64 payload.
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>> {
    let normalized = normalize(encoded);
    PAYLOAD_ENGINE
        .decode(normalized.as_bytes())
        .map_err(|e| FiledropError::Decode(format!("invalid base64 payload: {e}")))
}
