//! Token derivation bound to one configuration and one clock.
//!
//! Time-based counters use round-to-nearest-step semantics: an instant is
//! rounded to the nearest multiple of the step (halfway rounds up) before
//! dividing. A token is therefore valid for a window centred on its step
//! boundary, half a step earlier than the RFC 6238 floor formula would give.
//! Other RFC 6238 implementations will disagree with this one for the first
//! half of every step.

use chrono::{DateTime, Utc};
use log::debug;

use crate::otp::clock::{Clock, SystemClock};
use crate::otp::config::OtpConfig;
use crate::otp::core;
use crate::otp::secret::decode_secret;
use crate::otp::types::*;

/// Derives tokens for any secret under a fixed [`OtpConfig`].
#[derive(Debug, Clone)]
pub struct TokenDeriver<C: Clock = SystemClock> {
    config: OtpConfig,
    clock: C,
}

impl TokenDeriver<SystemClock> {
    /// A deriver reading the host wall clock.
    pub fn new(config: OtpConfig) -> Result<Self, OtpError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> TokenDeriver<C> {
    pub fn with_clock(config: OtpConfig, clock: C) -> Result<Self, OtpError> {
        config.validate()?;
        Ok(Self { config, clock })
    }

    /// For configs that already passed [`OtpConfig::validate`].
    pub(crate) fn from_validated(config: OtpConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Counter-based
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Derive the token for base-32 `secret_text` at `counter`.
    pub fn derive_token(&self, secret_text: &str, counter: u64) -> Result<String, OtpError> {
        let key = decode_secret(secret_text)?;
        self.derive_from_key(&key, counter)
    }

    /// Derive the token for raw key bytes at `counter`.
    pub fn derive_from_key(&self, key: &[u8], counter: u64) -> Result<String, OtpError> {
        core::hotp_raw(key, counter, self.config.digits)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Time-based
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Step index for `at`, rounded to the nearest step. Instants before the
    /// epoch map to counter 0.
    pub fn counter_at(&self, at: DateTime<Utc>) -> u64 {
        counter_for_millis(at.timestamp_millis(), self.step_millis())
    }

    pub fn current_counter(&self) -> u64 {
        self.counter_at(self.clock.now())
    }

    pub fn current_token(&self, secret_text: &str) -> Result<String, OtpError> {
        self.token_at(secret_text, self.clock.now())
    }

    pub fn token_at(&self, secret_text: &str, at: DateTime<Utc>) -> Result<String, OtpError> {
        self.derive_token(secret_text, self.counter_at(at))
    }

    /// Tokens for the previous, current and next step, in that order.
    pub fn token_window(&self, secret_text: &str) -> Result<[String; 3], OtpError> {
        self.token_window_at(secret_text, self.clock.now())
    }

    pub fn token_window_at(
        &self,
        secret_text: &str,
        at: DateTime<Utc>,
    ) -> Result<[String; 3], OtpError> {
        let key = decode_secret(secret_text)?;
        let [prev, cur, next] = self.window_counters(at);
        Ok([
            self.derive_from_key(&key, prev)?,
            self.derive_from_key(&key, cur)?,
            self.derive_from_key(&key, next)?,
        ])
    }

    /// Each shifted instant is rounded on its own, not derived from the
    /// current counter by ±1.
    fn window_counters(&self, at: DateTime<Utc>) -> [u64; 3] {
        let ms = at.timestamp_millis();
        let step = self.step_millis();
        [
            counter_for_millis(ms.saturating_sub(step), step),
            counter_for_millis(ms, step),
            counter_for_millis(ms.saturating_add(step), step),
        ]
    }

    /// Seconds until the token for `at` stops being current.
    pub fn seconds_remaining_at(&self, at: DateTime<Utc>) -> u64 {
        let ms = at.timestamp_millis().max(0);
        let step = self.step_millis();
        let counter = counter_for_millis(ms, step) as i64;
        // First instant that rounds to the next counter.
        let end = counter
            .saturating_mul(step)
            .saturating_add(step - step / 2);
        let remaining = end.saturating_sub(ms).max(0) as u64;
        remaining.div_ceil(1000)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Verification
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Check `candidate` against the token window at the current time.
    pub fn verify(&self, secret_text: &str, candidate: &str) -> Result<VerifyResult, OtpError> {
        self.verify_at(secret_text, candidate, self.clock.now())
    }

    /// Check `candidate` against the window at `at`: current step first,
    /// then previous, then next.
    pub fn verify_at(
        &self,
        secret_text: &str,
        candidate: &str,
        at: DateTime<Utc>,
    ) -> Result<VerifyResult, OtpError> {
        let key = decode_secret(secret_text)?;

        if candidate.len() != self.config.digits as usize
            || !candidate.bytes().all(|b| b.is_ascii_digit())
        {
            return Ok(VerifyResult::rejected());
        }

        let [prev, cur, next] = self.window_counters(at);
        for c in [cur, prev, next] {
            let generated = self.derive_from_key(&key, c)?;
            if core::constant_time_eq(generated.as_bytes(), candidate.as_bytes()) {
                let drift = c as i64 - cur as i64;
                debug!("token accepted with drift {}", drift);
                return Ok(VerifyResult {
                    valid: true,
                    drift,
                    matched_counter: Some(c),
                });
            }
        }

        debug!("token rejected");
        Ok(VerifyResult::rejected())
    }

    fn step_millis(&self) -> i64 {
        i64::try_from(self.config.step_seconds.saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}

/// `round(ms / step)` with halfway values rounding up; negative clamps to 0.
fn counter_for_millis(ms: i64, step: i64) -> u64 {
    if ms < 0 {
        return 0;
    }
    let q = ms / step;
    let r = ms % step;
    if r >= step - r {
        (q + 1) as u64
    } else {
        q as u64
    }
}
