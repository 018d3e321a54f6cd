//! Shared-secret generation and the base-32 text form.
//!
//! Secrets travel as unpadded RFC 4648 base-32 (`A–Z2–7`, no `=`).
//! Decoding upper-cases first, so lower-case input is accepted.

use log::{debug, warn};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::otp::config::DEFAULT_ENTROPY_LENGTH;
use crate::otp::types::*;

const ALPHABET: base32::Alphabet = base32::Alphabet::Rfc4648 { padding: false };

/// Draws random secrets of a fixed byte length from the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretGenerator {
    entropy_length: usize,
}

impl Default for SecretGenerator {
    fn default() -> Self {
        Self::with_length(DEFAULT_ENTROPY_LENGTH)
    }
}

impl SecretGenerator {
    pub fn with_length(entropy_length: usize) -> Self {
        Self { entropy_length }
    }

    /// Generate a new secret and return its base-32 text.
    ///
    /// Fails only when the OS random source does; the error is not retried.
    pub fn generate(&self) -> Result<String, OtpError> {
        self.generate_with(&mut OsRng)
    }

    fn generate_with<R: RngCore>(&self, rng: &mut R) -> Result<String, OtpError> {
        let mut buf = vec![0u8; self.entropy_length];
        rng.try_fill_bytes(&mut buf).map_err(|e| {
            OtpError::new(
                OtpErrorKind::EntropyUnavailable,
                "OS secure random source failed",
            )
            .with_detail(e.to_string())
        })?;
        debug!("generated {}-byte shared secret", buf.len());
        Ok(encode_secret(&buf))
    }
}

/// Encode raw bytes to base-32 (no padding, uppercase).
pub fn encode_secret(bytes: &[u8]) -> String {
    base32::encode(ALPHABET, bytes)
}

/// Decode base-32 secret text (case-insensitive, unpadded).
///
/// Characters outside `A–Z2–7` (including `=`) and trailing groups of 1, 3
/// or 6 symbols are rejected. The empty string decodes to an empty key.
pub fn decode_secret(text: &str) -> Result<Vec<u8>, OtpError> {
    let upper = text.to_ascii_uppercase();

    if let Some((pos, c)) = upper
        .char_indices()
        .find(|(_, c)| !matches!(c, 'A'..='Z' | '2'..='7'))
    {
        warn!("rejected {}-character secret: invalid base-32 symbol", text.len());
        return Err(
            OtpError::new(OtpErrorKind::InvalidSecret, "Invalid base-32 secret")
                .with_detail(format!("illegal character {:?} at byte {}", c, pos)),
        );
    }

    if matches!(upper.len() % 8, 1 | 3 | 6) {
        warn!("rejected {}-character secret: truncated base-32 group", text.len());
        return Err(
            OtpError::new(OtpErrorKind::InvalidSecret, "Invalid base-32 secret")
                .with_detail(format!("impossible length {}", upper.len())),
        );
    }

    base32::decode(ALPHABET, &upper)
        .ok_or_else(|| OtpError::new(OtpErrorKind::InvalidSecret, "Invalid base-32 secret"))
}

/// Check if a string is well-formed secret text.
pub fn is_valid_secret(text: &str) -> bool {
    !text.is_empty() && decode_secret(text).is_ok()
}
