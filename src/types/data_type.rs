// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor data types.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A reading a sensor entry can expose.
///
/// The names match the value keys of decoded sensor events.
///
/// # Examples
///
/// ```
/// use rfxtrx_lib::types::DataType;
///
/// let dt: DataType = "Humidity".parse().unwrap();
/// assert_eq!(dt.unit(), "%");
/// assert_eq!(dt.key(), "Humidity");
/// assert!("Altitude".parse::<DataType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    /// Temperature in degrees Celsius.
    Temperature,
    /// Second temperature probe.
    Temperature2,
    /// Relative humidity.
    Humidity,
    /// Barometric pressure.
    Barometer,
    /// Wind direction.
    WindDirection,
    /// Rain rate.
    RainRate,
    /// Instantaneous energy usage.
    EnergyUsage,
    /// Cumulative energy usage.
    TotalUsage,
    /// Sound level.
    Sound,
    /// Sensor status flag.
    SensorStatus,
    /// Counter value.
    CounterValue,
    /// UV index.
    Uv,
}

impl DataType {
    /// Every data type, in display order.
    pub const ALL: [Self; 12] = [
        Self::Temperature,
        Self::Temperature2,
        Self::Humidity,
        Self::Barometer,
        Self::WindDirection,
        Self::RainRate,
        Self::EnergyUsage,
        Self::TotalUsage,
        Self::Sound,
        Self::SensorStatus,
        Self::CounterValue,
        Self::Uv,
    ];

    /// The value key this data type reads from a decoded event.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Temperature2 => "Temperature2",
            Self::Humidity => "Humidity",
            Self::Barometer => "Barometer",
            Self::WindDirection => "Wind direction",
            Self::RainRate => "Rain rate",
            Self::EnergyUsage => "Energy usage",
            Self::TotalUsage => "Total usage",
            Self::Sound => "Sound",
            Self::SensorStatus => "Sensor Status",
            Self::CounterValue => "Counter value",
            Self::Uv => "UV",
        }
    }

    /// Unit of measurement, empty when unitless.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature | Self::Temperature2 => "°C",
            Self::Humidity => "%",
            Self::EnergyUsage | Self::TotalUsage => "W",
            Self::Uv => "uv",
            _ => "",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DataType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dt| dt.key() == s)
            .ok_or_else(|| ConfigError::UnknownDataType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_every_key() {
        for dt in DataType::ALL {
            assert_eq!(dt.key().parse::<DataType>().unwrap(), dt);
        }
    }

    #[test]
    fn keys_are_case_sensitive() {
        assert!("temperature".parse::<DataType>().is_err());
        assert!(matches!(
            "Wind speed".parse::<DataType>(),
            Err(ConfigError::UnknownDataType(s)) if s == "Wind speed"
        ));
    }

    #[test]
    fn units() {
        assert_eq!(DataType::Temperature.unit(), "°C");
        assert_eq!(DataType::TotalUsage.unit(), "W");
        assert_eq!(DataType::Sound.unit(), "");
    }
}
