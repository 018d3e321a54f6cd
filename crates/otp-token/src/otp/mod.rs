//! OTP crate: sub-modules.

pub mod types;
pub mod config;
pub mod core;
pub mod secret;
pub mod clock;
pub mod deriver;
pub mod settings;

// Re-export top-level items for convenience.
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::OtpConfig;
pub use deriver::TokenDeriver;
pub use secret::SecretGenerator;
pub use settings::{
    current_token, derive_token, generate, set_digit_width, set_entropy_length, set_time_step,
    token_window,
};
pub use types::*;
