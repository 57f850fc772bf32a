//! Unit-tagged scalar values for the finite set of units the models use.
//!
//! Units arrive as strings in configuration files and map documents, so a
//! [`Quantity`] carries a runtime [`Unit`] tag. Frequency and thermodynamic
//! temperature conversions go through the `uom` SI types; Rayleigh-Jeans
//! brightness temperature is its own dimension (it is not convertible to K
//! without a frequency) and uses a scale table.
//!
//! Only conversions that are a pure scale factor are supported. Conversions
//! that depend on frequency (Rayleigh-Jeans to thermodynamic CMB units, flux
//! densities) are outside this layer; asking for them is a
//! [`SkyError::UnitMismatch`].

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uom::si::f64::{Frequency, ThermodynamicTemperature};
use uom::si::frequency::{gigahertz, hertz, kilohertz, megahertz, terahertz};
use uom::si::thermodynamic_temperature::kelvin;

use crate::errors::{ErrorInfo, SkyError};

/// Thermodynamic temperature.
pub type Temperature = ThermodynamicTemperature;

/// Physical dimension of a [`Unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Frequency, canonical unit GHz.
    Frequency,
    /// Thermodynamic temperature, canonical unit K.
    Temperature,
    /// Rayleigh-Jeans brightness temperature, canonical unit uK_RJ.
    BrightnessTemperature,
    /// Pure number.
    Dimensionless,
}

/// Units understood by the emission models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Hertz.
    Hz,
    /// Kilohertz.
    KHz,
    /// Megahertz.
    MHz,
    /// Gigahertz.
    GHz,
    /// Terahertz.
    THz,
    /// Kelvin.
    K,
    /// Kelvin Rayleigh-Jeans.
    KRj,
    /// Millikelvin Rayleigh-Jeans.
    MKRj,
    /// Microkelvin Rayleigh-Jeans.
    UKRj,
    /// Dimensionless value.
    Dimensionless,
}

impl Unit {
    /// Returns the dimension of the unit.
    pub fn dimension(self) -> Dimension {
        match self {
            Unit::Hz | Unit::KHz | Unit::MHz | Unit::GHz | Unit::THz => Dimension::Frequency,
            Unit::K => Dimension::Temperature,
            Unit::KRj | Unit::MKRj | Unit::UKRj => Dimension::BrightnessTemperature,
            Unit::Dimensionless => Dimension::Dimensionless,
        }
    }

    /// Factor taking a Rayleigh-Jeans or dimensionless value to uK_RJ (or 1).
    fn brightness_factor(self) -> Option<f64> {
        match self {
            Unit::KRj => Some(1e6),
            Unit::MKRj => Some(1e3),
            Unit::UKRj | Unit::Dimensionless => Some(1.0),
            _ => None,
        }
    }

    /// Expresses `value` in `target`, failing with [`SkyError::UnitMismatch`]
    /// when the dimensions differ.
    pub fn convert(self, value: f64, target: Unit) -> Result<f64, SkyError> {
        if self.dimension() != target.dimension() {
            return Err(incompatible(self, target));
        }
        if self == target {
            return Ok(value);
        }
        let converted = match self.dimension() {
            Dimension::Frequency => {
                to_frequency(value, self).and_then(|freq| frequency_in(freq, target))
            }
            Dimension::Temperature => {
                to_temperature(value, self).and_then(|temp| temperature_in(temp, target))
            }
            Dimension::BrightnessTemperature | Dimension::Dimensionless => self
                .brightness_factor()
                .zip(target.brightness_factor())
                .map(|(from, to)| value * from / to),
        };
        converted.ok_or_else(|| incompatible(self, target))
    }

    /// Returns the factor `f` such that `value_in_self * f == value_in_target`.
    pub fn conversion_factor(self, target: Unit) -> Result<f64, SkyError> {
        self.convert(1.0, target)
    }

    /// Canonical string form used in configuration files and map headers.
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Hz => "Hz",
            Unit::KHz => "kHz",
            Unit::MHz => "MHz",
            Unit::GHz => "GHz",
            Unit::THz => "THz",
            Unit::K => "K",
            Unit::KRj => "K_RJ",
            Unit::MKRj => "mK_RJ",
            Unit::UKRj => "uK_RJ",
            Unit::Dimensionless => "",
        }
    }
}

fn incompatible(from: Unit, to: Unit) -> SkyError {
    SkyError::UnitMismatch(
        ErrorInfo::new("incompatible-units", "cannot convert between dimensions")
            .with_context("from", from)
            .with_context("to", to),
    )
}

fn to_frequency(value: f64, unit: Unit) -> Option<Frequency> {
    let freq = match unit {
        Unit::Hz => Frequency::new::<hertz>(value),
        Unit::KHz => Frequency::new::<kilohertz>(value),
        Unit::MHz => Frequency::new::<megahertz>(value),
        Unit::GHz => Frequency::new::<gigahertz>(value),
        Unit::THz => Frequency::new::<terahertz>(value),
        _ => return None,
    };
    Some(freq)
}

fn frequency_in(freq: Frequency, unit: Unit) -> Option<f64> {
    let value = match unit {
        Unit::Hz => freq.get::<hertz>(),
        Unit::KHz => freq.get::<kilohertz>(),
        Unit::MHz => freq.get::<megahertz>(),
        Unit::GHz => freq.get::<gigahertz>(),
        Unit::THz => freq.get::<terahertz>(),
        _ => return None,
    };
    Some(value)
}

fn to_temperature(value: f64, unit: Unit) -> Option<Temperature> {
    match unit {
        Unit::K => Some(Temperature::new::<kelvin>(value)),
        _ => None,
    }
}

fn temperature_in(temp: Temperature, unit: Unit) -> Option<f64> {
    match unit {
        Unit::K => Some(temp.get::<kelvin>()),
        _ => None,
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = SkyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = match s.trim() {
            "Hz" => Unit::Hz,
            "kHz" => Unit::KHz,
            "MHz" => Unit::MHz,
            "GHz" => Unit::GHz,
            "THz" => Unit::THz,
            "K" => Unit::K,
            "K_RJ" => Unit::KRj,
            "mK_RJ" => Unit::MKRj,
            "uK_RJ" => Unit::UKRj,
            "" | "dimensionless" => Unit::Dimensionless,
            other => {
                return Err(SkyError::UnitMismatch(
                    ErrorInfo::new("unknown-unit", "unit string is not recognised")
                        .with_context("unit", other)
                        .with_hint("use one of Hz, kHz, MHz, GHz, THz, K, K_RJ, mK_RJ, uK_RJ"),
                ))
            }
        };
        Ok(unit)
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A scalar value tagged with a [`Unit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    value: f64,
    unit: Unit,
}

impl Quantity {
    /// Creates a new quantity.
    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Shorthand for a frequency in GHz.
    pub const fn ghz(value: f64) -> Self {
        Self::new(value, Unit::GHz)
    }

    /// Shorthand for a temperature in K.
    pub const fn kelvin(value: f64) -> Self {
        Self::new(value, Unit::K)
    }

    /// Returns the raw value in the quantity's own unit.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the unit tag.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Converts to `target`, failing with [`SkyError::UnitMismatch`] when the
    /// dimensions differ.
    pub fn to(&self, target: Unit) -> Result<Quantity, SkyError> {
        Ok(Quantity::new(self.unit.convert(self.value, target)?, target))
    }

    /// The quantity as a typed `uom` frequency.
    pub fn frequency(&self) -> Result<Frequency, SkyError> {
        to_frequency(self.value, self.unit).ok_or_else(|| incompatible(self.unit, Unit::GHz))
    }

    /// The quantity as a typed `uom` thermodynamic temperature.
    pub fn temperature(&self) -> Result<Temperature, SkyError> {
        to_temperature(self.value, self.unit).ok_or_else(|| incompatible(self.unit, Unit::K))
    }

    /// Returns the value expressed in `target`.
    pub fn value_in(&self, target: Unit) -> Result<f64, SkyError> {
        Ok(self.to(target)?.value)
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::Dimensionless => write!(f, "{}", self.value),
            unit => write!(f, "{} {}", self.value, unit),
        }
    }
}

impl FromStr for Quantity {
    type Err = SkyError;

    /// Parses `"<value> <unit>"`, e.g. `"353 GHz"` or `"1500 MHz"`. A bare
    /// number is dimensionless.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        let value: f64 = number.trim().parse().map_err(|_| {
            SkyError::InvalidParameter(
                ErrorInfo::new("quantity-parse", "quantity value is not a number")
                    .with_context("input", trimmed),
            )
        })?;
        Ok(Quantity::new(value, unit.parse()?))
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Quantity::new(value, Unit::Dimensionless)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}
