//! Core OTP derivation — RFC 4226 §5.3.
//!
//! Pure functions of `(key bytes, counter, digits)`: HMAC-SHA-1 over the
//! big-endian counter, dynamic truncation to 31 bits, decimal reduction and
//! zero padding. No configuration or clock is read here.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::otp::config::check_digits;
use crate::otp::types::*;

/// Length of an HMAC-SHA-1 digest.
pub const DIGEST_LEN: usize = 20;

/// Compute an HOTP code for the given raw key bytes and counter.
pub fn hotp_raw(key: &[u8], counter: u64, digits: u8) -> Result<String, OtpError> {
    let digest = compute_hmac(key, counter);
    format_code(truncate(&digest), digits)
}

/// HMAC-SHA-1(key, counter as 8 big-endian bytes).
pub fn compute_hmac(key: &[u8], counter: u64) -> [u8; DIGEST_LEN] {
    let mut mac = Hmac::<Sha1>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(&counter.to_be_bytes());
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    digest
}

/// Dynamic truncation: the low nibble of the last byte picks a 4-byte
/// window, read big-endian with the sign bit cleared.
pub fn truncate(digest: &[u8; DIGEST_LEN]) -> u32 {
    let offset = (digest[DIGEST_LEN - 1] & 0x0f) as usize;
    let header = u32::from_be_bytes([
        digest[offset],
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    header & 0x7fff_ffff
}

/// `value mod 10^digits`, left-zero-padded to exactly `digits` characters.
///
/// Widths outside `1..=10` are rejected with `InvalidDigits`.
pub fn format_code(value: u32, digits: u8) -> Result<String, OtpError> {
    check_digits(digits)?;
    let modulus = 10u64.pow(digits as u32);
    let code = value as u64 % modulus;
    Ok(format!("{:0>width$}", code, width = digits as usize))
}

/// Constant-time comparison (to prevent timing attacks on code verification).
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
