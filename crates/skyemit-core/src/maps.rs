//! Pixel maps, per-pixel spectral parameters and the emission output buffer.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SkyError};
use crate::units::Unit;

/// Number of pixels of a HEALPix map at resolution `nside`.
///
/// `nside` must be a positive power of two.
pub fn npix_for_nside(nside: usize) -> Result<usize, SkyError> {
    if nside == 0 || !nside.is_power_of_two() {
        return Err(SkyError::InvalidParameter(
            ErrorInfo::new("invalid-nside", "nside must be a positive power of two")
                .with_context("nside", nside),
        ));
    }
    Ok(12 * nside * nside)
}

/// A sky map: one value per pixel, tagged with a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelMap {
    unit: Unit,
    values: Vec<f64>,
}

impl PixelMap {
    /// Creates a map from raw values.
    pub fn new(values: Vec<f64>, unit: Unit) -> Self {
        Self { unit, values }
    }

    /// Creates a map of `npix` copies of `value`.
    pub fn filled(npix: usize, value: f64, unit: Unit) -> Self {
        Self::new(vec![value; npix], unit)
    }

    /// Unit of the stored values.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pixel values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consumes the map, returning the pixel values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Converts the map to `target`, scaling every pixel.
    pub fn into_unit(mut self, target: Unit) -> Result<Self, SkyError> {
        let factor = self.unit.conversion_factor(target)?;
        if factor != 1.0 {
            self.values.iter_mut().for_each(|value| *value *= factor);
        }
        self.unit = target;
        Ok(self)
    }

    /// Fails with [`SkyError::ShapeMismatch`] unless the map has `npix` pixels.
    pub fn expect_len(&self, what: &str, npix: usize) -> Result<(), SkyError> {
        if self.values.len() != npix {
            return Err(SkyError::shape_mismatch(what, npix, self.values.len()));
        }
        Ok(())
    }
}

/// A spectral parameter that is either uniform over the sky or given per pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpectralParam {
    /// Same value for every pixel.
    Uniform(f64),
    /// One value per pixel.
    PerPixel(Vec<f64>),
}

impl SpectralParam {
    /// Takes a per-pixel parameter from a map, converting it to `unit` first.
    pub fn from_map(map: PixelMap, unit: Unit) -> Result<Self, SkyError> {
        Ok(SpectralParam::PerPixel(map.into_unit(unit)?.into_values()))
    }

    /// Value at pixel `pix`.
    #[inline]
    pub fn at(&self, pix: usize) -> f64 {
        match self {
            SpectralParam::Uniform(value) => *value,
            SpectralParam::PerPixel(values) => values[pix],
        }
    }

    /// Checks a per-pixel parameter against the template length.
    pub fn check_len(&self, what: &str, npix: usize) -> Result<(), SkyError> {
        match self {
            SpectralParam::Uniform(_) => Ok(()),
            SpectralParam::PerPixel(values) if values.len() == npix => Ok(()),
            SpectralParam::PerPixel(values) => {
                Err(SkyError::shape_mismatch(what, npix, values.len()))
            }
        }
    }

    /// Applies `f` to every stored value.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            SpectralParam::Uniform(value) => SpectralParam::Uniform(f(value)),
            SpectralParam::PerPixel(values) => {
                SpectralParam::PerPixel(values.into_iter().map(f).collect())
            }
        }
    }

    /// Returns true when any stored value fails `predicate`.
    pub fn any(&self, predicate: impl Fn(f64) -> bool) -> bool {
        match self {
            SpectralParam::Uniform(value) => predicate(*value),
            SpectralParam::PerPixel(values) => values.iter().copied().any(predicate),
        }
    }
}

impl From<f64> for SpectralParam {
    fn from(value: f64) -> Self {
        SpectralParam::Uniform(value)
    }
}

impl From<Vec<f64>> for SpectralParam {
    fn from(values: Vec<f64>) -> Self {
        SpectralParam::PerPixel(values)
    }
}

/// Emission maps indexed by (frequency, polarization, pixel).
///
/// Stored as one contiguous row-major buffer so a whole frequency slab can be
/// handed to a worker thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionMaps {
    nfreq: usize,
    npol: usize,
    npix: usize,
    unit: Unit,
    data: Vec<f64>,
}

impl EmissionMaps {
    /// Allocates a zero-filled buffer.
    pub fn zeros(nfreq: usize, npol: usize, npix: usize, unit: Unit) -> Self {
        Self {
            nfreq,
            npol,
            npix,
            unit,
            data: vec![0.0; nfreq * npol * npix],
        }
    }

    /// Number of frequencies.
    pub fn nfreq(&self) -> usize {
        self.nfreq
    }

    /// Number of polarization channels (1 for intensity only, 3 for IQU).
    pub fn npol(&self) -> usize {
        self.npol
    }

    /// Number of pixels.
    pub fn npix(&self) -> usize {
        self.npix
    }

    /// Output unit.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Value at `(freq, pol, pix)`.
    pub fn get(&self, freq: usize, pol: usize, pix: usize) -> f64 {
        self.data[self.offset(freq, pol) + pix]
    }

    /// Pixel values of one (frequency, polarization) plane.
    pub fn plane(&self, freq: usize, pol: usize) -> &[f64] {
        let start = self.offset(freq, pol);
        &self.data[start..start + self.npix]
    }

    /// Mutable pixel values of one (frequency, polarization) plane.
    pub fn plane_mut(&mut self, freq: usize, pol: usize) -> &mut [f64] {
        let start = self.offset(freq, pol);
        &mut self.data[start..start + self.npix]
    }

    /// Length of the slab holding every polarization of one frequency.
    pub fn slab_len(&self) -> usize {
        self.npol * self.npix
    }

    /// Whole buffer in (frequency, polarization, pixel) order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Whole mutable buffer in (frequency, polarization, pixel) order.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consumes the maps, returning the flat buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Multiplies plane `(freq, pol)` by `factor`.
    pub fn scale_plane(&mut self, freq: usize, pol: usize, factor: f64) {
        self.plane_mut(freq, pol)
            .iter_mut()
            .for_each(|value| *value *= factor);
    }

    fn offset(&self, freq: usize, pol: usize) -> usize {
        (freq * self.npol + pol) * self.npix
    }
}
