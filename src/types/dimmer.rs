// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dim level type.
//!
//! Three scales meet here: percentages as decoded packets report them
//! (`"Dim level"`), 0-255 brightness as hosts store it, and the 0-15 level
//! carried on the air by Lighting2 devices.

use std::fmt;

use crate::error::ValueError;

/// Highest Lighting2 dim level on the air.
const MAX_LEVEL: u16 = 15;

/// Dim level as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use rfxtrx_lib::types::Dimmer;
///
/// let dim = Dimmer::new(50).unwrap();
/// assert_eq!(dim.to_brightness(), 127);
///
/// // Lighting2 level 15 is full brightness
/// assert_eq!(Dimmer::from_level(15), Dimmer::MAX);
///
/// assert!(Dimmer::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dimmer(u8);

impl Dimmer {
    /// Minimum dim level (0%).
    pub const MIN: Self = Self(0);

    /// Maximum dim level (100%).
    pub const MAX: Self = Self(100);

    /// Creates a new dim level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a dim level, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Converts a 0-255 brightness to a percentage, rounding down.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_brightness(brightness: u8) -> Self {
        Self((u16::from(brightness) * 100 / 255) as u8)
    }

    /// Converts the percentage to a 0-255 brightness, rounding down.
    ///
    /// This is the `dim * 255 / 100` rule applied to received "Set level"
    /// commands.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_brightness(&self) -> u8 {
        (u16::from(self.0) * 255 / 100) as u8
    }

    /// Converts a 0-15 Lighting2 level to a percentage, rounding down.
    ///
    /// Levels above 15 are clamped.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_level(level: u8) -> Self {
        let level = u16::from(level).min(MAX_LEVEL);
        Self((level * 100 / MAX_LEVEL) as u8)
    }

    /// Converts the percentage to the nearest 0-15 Lighting2 level.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_level(&self) -> u8 {
        ((u16::from(self.0) * MAX_LEVEL + 50) / 100) as u8
    }
}

impl fmt::Display for Dimmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Dimmer {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
