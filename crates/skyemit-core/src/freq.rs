//! Validated frequency input shared by every model's `get_emission`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uom::si::frequency::gigahertz;

use crate::errors::{ErrorInfo, SkyError};
use crate::units::{Dimension, Quantity, Unit};

fn freq_error(code: &str, message: impl Into<String>) -> SkyError {
    SkyError::InvalidFrequencyInput(ErrorInfo::new(code, message))
}

/// One or more observing frequencies, normalised to GHz.
///
/// A scalar frequency, a sequence, and a bandpass-equivalent effective
/// frequency computed by the caller all end up as a non-empty 1-D sequence of
/// positive, finite GHz values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Quantity>", into = "Vec<Quantity>")]
pub struct Frequencies {
    ghz: Vec<f64>,
}

impl Frequencies {
    /// Validates `values` expressed in `unit`.
    pub fn new(values: &[f64], unit: Unit) -> Result<Self, SkyError> {
        if unit.dimension() != Dimension::Frequency {
            return Err(SkyError::UnitMismatch(
                ErrorInfo::new("not-a-frequency", "frequencies require a frequency unit")
                    .with_context("unit", unit),
            ));
        }
        if values.is_empty() {
            return Err(freq_error(
                "empty-frequencies",
                "at least one frequency is required",
            ));
        }
        let factor = unit.conversion_factor(Unit::GHz)?;
        let mut ghz = Vec::with_capacity(values.len());
        for (index, &value) in values.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(SkyError::InvalidFrequencyInput(
                    ErrorInfo::new("non-positive-frequency", "frequencies must be positive")
                        .with_context("index", index)
                        .with_context("value", value),
                ));
            }
            ghz.push(value * factor);
        }
        Ok(Self { ghz })
    }

    /// Validates GHz values.
    pub fn from_ghz(values: &[f64]) -> Result<Self, SkyError> {
        Self::new(values, Unit::GHz)
    }

    /// Validates a single frequency quantity.
    pub fn scalar(frequency: Quantity) -> Result<Self, SkyError> {
        Self::new(&[frequency.value()], frequency.unit())
    }

    /// Validates a list of quantities that may carry different frequency units.
    pub fn from_quantities(quantities: &[Quantity]) -> Result<Self, SkyError> {
        if quantities.is_empty() {
            return Err(freq_error(
                "empty-frequencies",
                "at least one frequency is required",
            ));
        }
        let mut ghz = Vec::with_capacity(quantities.len());
        for quantity in quantities {
            if quantity.unit().dimension() != Dimension::Frequency {
                return Err(SkyError::UnitMismatch(
                    ErrorInfo::new("not-a-frequency", "frequencies require a frequency unit")
                        .with_context("quantity", quantity),
                ));
            }
            ghz.push(quantity.frequency()?.get::<gigahertz>());
        }
        Self::from_ghz(&ghz)
    }

    /// Frequencies in GHz, in the order supplied.
    pub fn as_ghz(&self) -> &[f64] {
        &self.ghz
    }

    /// Number of frequencies.
    pub fn len(&self) -> usize {
        self.ghz.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.ghz.is_empty()
    }
}

impl TryFrom<Vec<Quantity>> for Frequencies {
    type Error = SkyError;

    fn try_from(value: Vec<Quantity>) -> Result<Self, Self::Error> {
        Self::from_quantities(&value)
    }
}

impl From<Frequencies> for Vec<Quantity> {
    fn from(value: Frequencies) -> Self {
        value.ghz.into_iter().map(Quantity::ghz).collect()
    }
}

impl TryFrom<Quantity> for Frequencies {
    type Error = SkyError;

    fn try_from(value: Quantity) -> Result<Self, Self::Error> {
        Self::scalar(value)
    }
}

impl FromStr for Frequencies {
    type Err = SkyError;

    /// Parses a comma separated list such as `"30 GHz, 100 GHz, 0.353 THz"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let quantities = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Quantity>, _>>()?;
        Self::from_quantities(&quantities)
    }
}
