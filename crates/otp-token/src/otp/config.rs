//! Derivation settings: digit width, time-step length and entropy length.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::otp::types::*;

pub const DEFAULT_DIGITS: u8 = 6;
pub const DEFAULT_STEP_SECONDS: u64 = 30;
pub const DEFAULT_ENTROPY_LENGTH: usize = 20;

/// Widest code that still carries information: the truncated value is a
/// 31-bit integer, always below `10^10`.
pub const MAX_DIGITS: u8 = 10;

/// Immutable configuration handed to a [`TokenDeriver`](crate::otp::TokenDeriver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OtpConfig {
    /// Number of decimal digits in each token.
    pub digits: u8,
    /// Length of one time step in seconds.
    pub step_seconds: u64,
    /// Byte length of generated secrets.
    pub entropy_length: usize,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            digits: DEFAULT_DIGITS,
            step_seconds: DEFAULT_STEP_SECONDS,
            entropy_length: DEFAULT_ENTROPY_LENGTH,
        }
    }
}

impl OtpConfig {
    pub fn with_digits(mut self, digits: u8) -> Result<Self, OtpError> {
        check_digits(digits)?;
        self.digits = digits;
        Ok(self)
    }

    pub fn with_step(mut self, step: Duration) -> Result<Self, OtpError> {
        self.step_seconds = step_to_seconds(step)?;
        Ok(self)
    }

    /// Any length is accepted; zero yields an empty secret.
    pub fn with_entropy_length(mut self, entropy_length: usize) -> Self {
        self.entropy_length = entropy_length;
        self
    }

    /// Reject digit widths outside `1..=10` and a zero step.
    pub fn validate(&self) -> Result<(), OtpError> {
        check_digits(self.digits)?;
        if self.step_seconds == 0 {
            return Err(OtpError::new(
                OtpErrorKind::InvalidPeriod,
                "Time step must be at least one second",
            ));
        }
        Ok(())
    }

    /// `10^digits`.
    pub fn modulus(&self) -> u64 {
        10u64.pow(self.digits as u32)
    }

    /// Parse and validate a JSON settings document.
    pub fn from_json(json: &str) -> Result<Self, OtpError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            OtpError::new(OtpErrorKind::InvalidInput, format!("JSON deserialise: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, OtpError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            OtpError::new(OtpErrorKind::Internal, format!("JSON serialise: {}", e))
        })
    }
}

pub(crate) fn check_digits(digits: u8) -> Result<(), OtpError> {
    if digits == 0 || digits > MAX_DIGITS {
        return Err(OtpError::new(
            OtpErrorKind::InvalidDigits,
            format!("Digit width must be between 1 and {}", MAX_DIGITS),
        )
        .with_detail(format!("got {}", digits)));
    }
    Ok(())
}

pub(crate) fn step_to_seconds(step: Duration) -> Result<u64, OtpError> {
    if step.subsec_nanos() != 0 || step.as_secs() == 0 {
        return Err(OtpError::new(
            OtpErrorKind::InvalidPeriod,
            "Time step must be a positive whole number of seconds",
        )
        .with_detail(format!("got {:?}", step)));
    }
    Ok(step.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ─────────────────────────────────────────────────

    #[test]
    fn defaults() {
        let c = OtpConfig::default();
        assert_eq!(c.digits, 6);
        assert_eq!(c.step_seconds, 30);
        assert_eq!(c.entropy_length, 20);
        assert_eq!(c.modulus(), 1_000_000);
        assert!(c.validate().is_ok());
    }

    // ── Builders ─────────────────────────────────────────────────

    #[test]
    fn with_digits_range() {
        assert_eq!(OtpConfig::default().with_digits(8).unwrap().modulus(), 100_000_000);
        assert_eq!(
            OtpConfig::default().with_digits(10).unwrap().modulus(),
            10_000_000_000
        );
        let err = OtpConfig::default().with_digits(0).unwrap_err();
        assert_eq!(err.kind, OtpErrorKind::InvalidDigits);
        assert!(err.is_configuration());
        assert!(OtpConfig::default().with_digits(11).is_err());
    }

    #[test]
    fn with_step_whole_seconds_only() {
        let c = OtpConfig::default().with_step(Duration::from_secs(60)).unwrap();
        assert_eq!(c.step_seconds, 60);

        let err = OtpConfig::default().with_step(Duration::ZERO).unwrap_err();
        assert_eq!(err.kind, OtpErrorKind::InvalidPeriod);
        assert!(OtpConfig::default()
            .with_step(Duration::from_millis(1500))
            .is_err());
    }

    #[test]
    fn entropy_length_unchecked() {
        assert_eq!(OtpConfig::default().with_entropy_length(0).entropy_length, 0);
        assert_eq!(OtpConfig::default().with_entropy_length(32).entropy_length, 32);
    }

    // ── JSON ─────────────────────────────────────────────────────

    #[test]
    fn json_partial_document_uses_defaults() {
        let c = OtpConfig::from_json(r#"{ "digits": 8 }"#).unwrap();
        assert_eq!(c.digits, 8);
        assert_eq!(c.step_seconds, 30);
        assert_eq!(c.entropy_length, 20);
    }

    #[test]
    fn json_roundtrip() {
        let c = OtpConfig::default().with_digits(7).unwrap();
        let json = c.to_json().unwrap();
        assert!(json.contains("\"stepSeconds\""));
        assert_eq!(OtpConfig::from_json(&json).unwrap(), c);
    }

    #[test]
    fn json_rejects_invalid_values() {
        let err = OtpConfig::from_json(r#"{ "stepSeconds": 0 }"#).unwrap_err();
        assert_eq!(err.kind, OtpErrorKind::InvalidPeriod);
        let err = OtpConfig::from_json(r#"{ "digits": 12 }"#).unwrap_err();
        assert_eq!(err.kind, OtpErrorKind::InvalidDigits);
        let err = OtpConfig::from_json("not json").unwrap_err();
        assert_eq!(err.kind, OtpErrorKind::InvalidInput);
    }
}
