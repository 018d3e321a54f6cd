//! Process-wide default settings and the free-function API over them.
//!
//! The setters validate before writing, so the stored config is always
//! valid. Every derivation copies the config once under the read lock; a
//! concurrent setter affects the next call, never one in flight. Callers
//! that need different settings side by side should build their own
//! [`TokenDeriver`] instead.

use std::sync::RwLock;
use std::time::Duration;

use lazy_static::lazy_static;
use log::info;

use crate::otp::clock::{Clock, SystemClock};
use crate::otp::config::{self, OtpConfig};
use crate::otp::deriver::TokenDeriver;
use crate::otp::secret::SecretGenerator;
use crate::otp::types::*;

lazy_static! {
    static ref SETTINGS: RwLock<OtpConfig> = RwLock::new(OtpConfig::default());
}

/// Copy of the current process-wide settings.
pub fn current_config() -> OtpConfig {
    // Writes happen only after validation, so a poisoned lock still holds a
    // valid config.
    *SETTINGS.read().unwrap_or_else(|e| e.into_inner())
}

fn update(f: impl FnOnce(&mut OtpConfig)) {
    let mut guard = SETTINGS.write().unwrap_or_else(|e| e.into_inner());
    f(&mut guard);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Setters
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Set the digit width (and so the modulus) for later derivations.
pub fn set_digit_width(digits: u8) -> Result<(), OtpError> {
    config::check_digits(digits)?;
    update(|c| c.digits = digits);
    info!("OTP digit width set to {}", digits);
    Ok(())
}

/// Set the step length used by [`current_token`] and [`token_window`].
pub fn set_time_step(step: Duration) -> Result<(), OtpError> {
    let seconds = config::step_to_seconds(step)?;
    update(|c| c.step_seconds = seconds);
    info!("OTP time step set to {}s", seconds);
    Ok(())
}

/// Set the byte length of secrets from [`generate`]. Zero is accepted and
/// yields empty secrets.
pub fn set_entropy_length(entropy_length: usize) {
    update(|c| c.entropy_length = entropy_length);
    info!("OTP entropy length set to {} bytes", entropy_length);
}

/// Restore the defaults (6 digits, 30 s, 20 bytes).
pub fn reset() {
    update(|c| *c = OtpConfig::default());
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Operations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A deriver snapshotting the current settings, on the system clock.
pub fn deriver() -> TokenDeriver<SystemClock> {
    deriver_with_clock(SystemClock)
}

/// A deriver snapshotting the current settings, on `clock`.
pub fn deriver_with_clock<C: Clock>(clock: C) -> TokenDeriver<C> {
    TokenDeriver::from_validated(current_config(), clock)
}

/// Generate a secret of the configured entropy length.
pub fn generate() -> Result<String, OtpError> {
    SecretGenerator::with_length(current_config().entropy_length).generate()
}

pub fn derive_token(secret_text: &str, counter: u64) -> Result<String, OtpError> {
    deriver().derive_token(secret_text, counter)
}

pub fn current_token(secret_text: &str) -> Result<String, OtpError> {
    deriver().current_token(secret_text)
}

/// `[previous, current, next]` tokens at the current time.
pub fn token_window(secret_text: &str) -> Result<[String; 3], OtpError> {
    deriver().token_window(secret_text)
}
