//! Spinning dust emission from an empirical emissivity curve.
//!
//! The curve tabulates emissivity against frequency for a reference peak
//! frequency. Shifting the peak rescales the frequency axis, so the model
//! stores the peak frequency as a ratio to the reference peak and looks the
//! curve up at `ν / ratio`.

use skyemit_core::errors::{ErrorInfo, SkyError};
use skyemit_core::{EmissionMaps, Frequencies, PixelMap, Quantity, RngHandle, SpectralParam};
use tracing::debug;

use crate::interp::EmissivityCurve;
use crate::mbb::{reference_frequency, template};
use crate::model::{evaluate_per_frequency, EmissionModel};

/// Construction inputs for [`SpinningDust`].
#[derive(Debug, Clone)]
pub struct SpinningDustSpec {
    /// Intensity template at `freq_ref_i`.
    pub map_i: PixelMap,
    /// Reference frequency of the intensity template.
    pub freq_ref_i: Quantity,
    /// Emissivity curve tabulated for `freq_ref_peak`.
    pub emissivity: EmissivityCurve,
    /// Peak frequency in GHz, uniform or per pixel.
    pub freq_peak: SpectralParam,
    /// Peak frequency the emissivity curve was tabulated for.
    pub freq_ref_peak: Quantity,
}

/// Unpolarized spinning dust model. Output has a single polarization plane.
#[derive(Debug, Clone)]
pub struct SpinningDust {
    i_ref: Vec<f64>,
    freq_ref_i: f64,
    peak_ratio: SpectralParam,
    emissivity: EmissivityCurve,
    reference_emissivity: SpectralParam,
    npix: usize,
}

impl SpinningDust {
    /// Validates the inputs and builds the model. The template is converted
    /// to uK_RJ and the peak frequency normalised by `freq_ref_peak`.
    pub fn new(spec: SpinningDustSpec) -> Result<Self, SkyError> {
        let npix = spec.map_i.len();
        if npix == 0 {
            return Err(SkyError::InvalidParameter(ErrorInfo::new(
                "empty-template",
                "templates must not be empty",
            )));
        }
        let freq_ref_i = reference_frequency("freq_ref_I", spec.freq_ref_i)?;
        let freq_ref_peak = reference_frequency("freq_ref_peak", spec.freq_ref_peak)?;
        spec.freq_peak.check_len("freq_peak", npix)?;
        if spec.freq_peak.any(|peak| !peak.is_finite() || peak <= 0.0) {
            return Err(SkyError::InvalidParameter(ErrorInfo::new(
                "invalid-peak-frequency",
                "peak frequency must be positive",
            )));
        }

        let peak_ratio = spec.freq_peak.map(|peak| peak / freq_ref_peak);
        let emissivity = spec.emissivity;
        let reference_emissivity = peak_ratio
            .clone()
            .map(|ratio| emissivity.eval(freq_ref_i / ratio));
        if reference_emissivity.any(|value| value == 0.0) {
            return Err(SkyError::InvalidParameter(
                ErrorInfo::new(
                    "zero-reference-emissivity",
                    "emissivity vanishes at the reference frequency",
                )
                .with_context("freq_ref_I", freq_ref_i),
            ));
        }

        let i_ref = template("map_I", spec.map_i, npix)?;
        debug!(
            npix,
            freq_ref_i,
            freq_ref_peak,
            curve_points = emissivity.len(),
            "built spinning dust model"
        );
        Ok(Self {
            i_ref,
            freq_ref_i,
            peak_ratio,
            emissivity,
            reference_emissivity,
            npix,
        })
    }

    /// Reference frequency of the intensity template in GHz.
    pub fn freq_ref_i(&self) -> f64 {
        self.freq_ref_i
    }

    /// Peak frequency divided by the reference peak frequency.
    pub fn peak_ratio(&self) -> &SpectralParam {
        &self.peak_ratio
    }

    /// Intensity template in uK_RJ.
    pub fn template(&self) -> &[f64] {
        &self.i_ref
    }

    /// Scaling from the reference frequency to `freq` at pixel `pix`:
    /// `(ν_ref/ν)² · ε(ν/r) / ε(ν_ref/r)` for peak ratio `r`.
    #[inline]
    pub fn scaling(&self, freq: f64, pix: usize) -> f64 {
        let ratio = self.peak_ratio.at(pix);
        (self.freq_ref_i / freq).powi(2) * self.emissivity.eval(freq / ratio)
            / self.reference_emissivity.at(pix)
    }

    /// Evaluates the model at `freqs`, returning `(nfreq, 1, npix)` maps in
    /// uK_RJ.
    pub fn get_emission(&self, freqs: &Frequencies) -> Result<EmissionMaps, SkyError> {
        Ok(evaluate_per_frequency(freqs, 1, self.npix, |freq, slab| {
            for (pix, out) in slab.iter_mut().enumerate() {
                *out = self.i_ref[pix] * self.scaling(freq, pix);
            }
        }))
    }
}

impl EmissionModel for SpinningDust {
    fn name(&self) -> &'static str {
        "spinning_dust"
    }

    fn npix(&self) -> usize {
        self.npix
    }

    fn npol(&self) -> usize {
        1
    }

    fn get_emission(
        &self,
        freqs: &Frequencies,
        _rng: &mut RngHandle,
    ) -> Result<EmissionMaps, SkyError> {
        SpinningDust::get_emission(self, freqs)
    }
}

/// Spinning dust with a fixed polarization angle and fraction.
#[derive(Debug, Clone)]
pub struct PolarizedSpinningDust {
    base: SpinningDust,
    pol_angle: Vec<f64>,
    pol_frac: SpectralParam,
}

impl PolarizedSpinningDust {
    /// Builds the polarized model. The polarization angle is
    /// `atan2(angle_u, angle_q)` per pixel. The two angle maps may carry any
    /// unit of the same dimension; `angle_u` is converted to the unit of
    /// `angle_q` before the ratio is taken.
    pub fn new(
        spec: SpinningDustSpec,
        pol_frac: SpectralParam,
        angle_q: PixelMap,
        angle_u: PixelMap,
    ) -> Result<Self, SkyError> {
        let base = SpinningDust::new(spec)?;
        let npix = base.npix;
        angle_q.expect_len("angle_Q", npix)?;
        angle_u.expect_len("angle_U", npix)?;
        let angle_u = angle_u.into_unit(angle_q.unit())?;
        pol_frac.check_len("pol_frac", npix)?;
        if pol_frac.any(|frac| !frac.is_finite()) {
            return Err(SkyError::InvalidParameter(ErrorInfo::new(
                "invalid-pol-frac",
                "polarization fraction must be finite",
            )));
        }
        let pol_angle = angle_u
            .values()
            .iter()
            .zip(angle_q.values())
            .map(|(&u, &q)| u.atan2(q))
            .collect();
        Ok(Self {
            base,
            pol_angle,
            pol_frac,
        })
    }

    /// Polarization angle in radians per pixel.
    pub fn pol_angle(&self) -> &[f64] {
        &self.pol_angle
    }

    /// The unpolarized model underneath.
    pub fn base(&self) -> &SpinningDust {
        &self.base
    }

    /// Evaluates the model at `freqs`, returning `(nfreq, 3, npix)` maps in
    /// uK_RJ.
    pub fn get_emission(&self, freqs: &Frequencies) -> Result<EmissionMaps, SkyError> {
        let npix = self.base.npix;
        let i_ref = &self.base.i_ref;
        Ok(evaluate_per_frequency(freqs, 3, npix, |freq, slab| {
            let (plane_i, rest) = slab.split_at_mut(npix);
            let (plane_q, plane_u) = rest.split_at_mut(npix);
            for pix in 0..npix {
                let scaling = self.base.scaling(freq, pix);
                let polarized = i_ref[pix] * self.pol_frac.at(pix);
                let angle = self.pol_angle[pix];
                plane_i[pix] = i_ref[pix] * scaling;
                plane_q[pix] = polarized * angle.cos() * scaling;
                plane_u[pix] = polarized * angle.sin() * scaling;
            }
        }))
    }
}

impl EmissionModel for PolarizedSpinningDust {
    fn name(&self) -> &'static str {
        "polarized_spinning_dust"
    }

    fn npix(&self) -> usize {
        self.base.npix
    }

    fn npol(&self) -> usize {
        3
    }

    fn get_emission(
        &self,
        freqs: &Frequencies,
        _rng: &mut RngHandle,
    ) -> Result<EmissionMaps, SkyError> {
        PolarizedSpinningDust::get_emission(self, freqs)
    }
}
