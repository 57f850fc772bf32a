//! Modified blackbody thermal dust model.

use skyemit_core::errors::{ErrorInfo, SkyError};
use skyemit_core::{
    EmissionMaps, Frequencies, PixelMap, Quantity, RngHandle, SpectralParam, Unit, I, Q, U,
};
use tracing::debug;

use crate::model::{evaluate_per_frequency, EmissionModel};
use crate::sed::mbb_scaling;

fn param_error(code: &str, message: impl Into<String>) -> SkyError {
    SkyError::InvalidParameter(ErrorInfo::new(code, message))
}

/// Validates a reference frequency and returns it in GHz. A bare number is
/// taken as GHz.
pub(crate) fn reference_frequency(name: &str, freq: Quantity) -> Result<f64, SkyError> {
    let ghz = match freq.unit() {
        Unit::Dimensionless => freq.value(),
        _ => freq.value_in(Unit::GHz)?,
    };
    if !ghz.is_finite() || ghz <= 0.0 {
        return Err(SkyError::InvalidParameter(
            ErrorInfo::new(
                "invalid-reference-frequency",
                "reference frequency must be positive",
            )
            .with_context("parameter", name)
            .with_context("value", freq),
        ));
    }
    Ok(ghz)
}

/// Converts a template to uK_RJ and checks its length against `npix`.
pub(crate) fn template(name: &str, map: PixelMap, npix: usize) -> Result<Vec<f64>, SkyError> {
    map.expect_len(name, npix)?;
    Ok(map.into_unit(Unit::UKRj)?.into_values())
}

/// Construction inputs for [`ModifiedBlackBody`].
#[derive(Debug, Clone)]
pub struct ModifiedBlackBodySpec {
    /// Intensity template at `freq_ref_i`.
    pub map_i: PixelMap,
    /// Stokes Q template at `freq_ref_p`.
    pub map_q: PixelMap,
    /// Stokes U template at `freq_ref_p`.
    pub map_u: PixelMap,
    /// Reference frequency of the intensity template.
    pub freq_ref_i: Quantity,
    /// Reference frequency shared by the Q and U templates.
    pub freq_ref_p: Quantity,
    /// Dust emissivity spectral index.
    pub index: SpectralParam,
    /// Dust temperature in K.
    pub temperature: SpectralParam,
}

/// Thermal dust emission scaled from I/Q/U templates with a modified
/// blackbody law.
#[derive(Debug, Clone)]
pub struct ModifiedBlackBody {
    iqu_ref: [Vec<f64>; 3],
    ref_freqs: [f64; 3],
    index: SpectralParam,
    temperature: SpectralParam,
    npix: usize,
}

impl ModifiedBlackBody {
    /// Validates the inputs and builds the model. Templates are converted to
    /// uK_RJ.
    pub fn new(spec: ModifiedBlackBodySpec) -> Result<Self, SkyError> {
        let npix = spec.map_i.len();
        if npix == 0 {
            return Err(param_error("empty-template", "templates must not be empty"));
        }
        let freq_ref_i = reference_frequency("freq_ref_I", spec.freq_ref_i)?;
        let freq_ref_p = reference_frequency("freq_ref_P", spec.freq_ref_p)?;

        spec.index.check_len("mbb_index", npix)?;
        spec.temperature.check_len("mbb_temperature", npix)?;
        if spec.index.any(|beta| !beta.is_finite()) {
            return Err(param_error(
                "invalid-index",
                "spectral index must be finite",
            ));
        }
        if spec.temperature.any(|temp| !temp.is_finite() || temp <= 0.0) {
            return Err(param_error(
                "invalid-temperature",
                "dust temperature must be positive",
            ));
        }

        let iqu_ref = [
            template("map_I", spec.map_i, npix)?,
            template("map_Q", spec.map_q, npix)?,
            template("map_U", spec.map_u, npix)?,
        ];
        debug!(npix, freq_ref_i, freq_ref_p, "built modified blackbody model");
        Ok(Self {
            iqu_ref,
            ref_freqs: [freq_ref_i, freq_ref_p, freq_ref_p],
            index: spec.index,
            temperature: spec.temperature,
            npix,
        })
    }

    /// Reference frequencies of the I, Q and U templates in GHz.
    pub fn reference_frequencies(&self) -> [f64; 3] {
        self.ref_freqs
    }

    /// Reference I/Q/U templates in uK_RJ.
    pub fn templates(&self) -> &[Vec<f64>; 3] {
        &self.iqu_ref
    }

    /// Evaluates the model at `freqs`, returning `(nfreq, 3, npix)` maps in
    /// uK_RJ.
    pub fn get_emission(&self, freqs: &Frequencies) -> Result<EmissionMaps, SkyError> {
        let npix = self.npix;
        Ok(evaluate_per_frequency(freqs, 3, npix, |freq, slab| {
            let row_i = self.scaling_row(freq, self.ref_freqs[I]);
            let row_p = self.scaling_row(freq, self.ref_freqs[Q]);
            for (pol, scaling) in [(I, &row_i), (Q, &row_p), (U, &row_p)] {
                let plane = &mut slab[pol * npix..(pol + 1) * npix];
                let template = &self.iqu_ref[pol];
                for ((out, factor), value) in plane.iter_mut().zip(scaling).zip(template) {
                    *out = factor * value;
                }
            }
        }))
    }

    /// Per-pixel modified blackbody scaling from `ref_freq` to `freq`.
    pub fn scaling_row(&self, freq: f64, ref_freq: f64) -> Vec<f64> {
        (0..self.npix)
            .map(|pix| mbb_scaling(freq, ref_freq, self.index.at(pix), self.temperature.at(pix)))
            .collect()
    }
}

impl EmissionModel for ModifiedBlackBody {
    fn name(&self) -> &'static str {
        "modified_blackbody"
    }

    fn npix(&self) -> usize {
        self.npix
    }

    fn npol(&self) -> usize {
        3
    }

    fn get_emission(
        &self,
        freqs: &Frequencies,
        _rng: &mut RngHandle,
    ) -> Result<EmissionMaps, SkyError> {
        ModifiedBlackBody::get_emission(self, freqs)
    }
}
