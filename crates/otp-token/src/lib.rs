//! # otp-token – HOTP / TOTP token derivation
//!
//! Shared-secret one-time codes without a network round-trip:
//!
//! - **Secrets** – OS-random shared secrets, unpadded RFC 4648 base-32 text
//! - **RFC 4226** – HMAC-SHA-1 digest, dynamic truncation, zero-padded decimal codes
//! - **Time steps** – round-to-nearest counters and a previous/current/next
//!   window to absorb clock skew between two parties
//! - **Configuration** – immutable per-deriver config, plus lock-guarded
//!   process-wide defaults for callers that want the global setters

pub mod otp;
