//! Threshold configuration.

use crate::error::{Error, Result};

/// Default per-channel threshold below which a pixel counts as background.
///
/// Tuned for generated images whose background is prompted to be pure black.
pub const DEFAULT_BLACK_THRESHOLD: u8 = 15;

/// Controls how dark a pixel must be, per channel, to be treated as background
/// and made transparent.
///
/// A pixel is background when its red, green and blue values are all strictly
/// below the threshold. The value is validated once, at construction, so a
/// `ThresholdConfig` in hand is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdConfig {
    black_threshold: u8,
}

impl ThresholdConfig {
    /// Create a configuration with the given black threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `black_threshold` is outside `0..=255`.
    pub fn new(black_threshold: i32) -> Result<Self> {
        u8::try_from(black_threshold)
            .map(|black_threshold| Self { black_threshold })
            .map_err(|_| Error::InvalidConfig {
                threshold: black_threshold,
            })
    }

    /// The exclusive per-channel upper bound for background pixels.
    #[must_use]
    pub const fn black_threshold(&self) -> u8 {
        self.black_threshold
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            black_threshold: DEFAULT_BLACK_THRESHOLD,
        }
    }
}

impl TryFrom<i32> for ThresholdConfig {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        Self::new(value)
    }
}
