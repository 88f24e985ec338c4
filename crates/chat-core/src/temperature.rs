//! The shared temperature scale.

use serde::{Deserialize, Serialize};

/// Temperature on the 0-10 scale shown to the user.
///
/// Backends rescale it to their native range with [`Temperature::scaled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Temperature(u8);

impl Temperature {
    /// Highest value on the scale.
    pub const MAX: u8 = 10;

    /// Create a temperature, clamping to `0..=10`.
    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    /// The raw 0-10 value.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Rescale into a backend's native range, e.g. `/5` for 0.0-2.0.
    pub fn scaled(&self, divisor: f32) -> f32 {
        if divisor <= 0.0 {
            return f32::from(self.0);
        }
        f32::from(self.0) / divisor
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self(5)
    }
}

impl From<u8> for Temperature {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Temperature> for u8 {
    fn from(value: Temperature) -> Self {
        value.0
    }
}
