//! Modified blackbody dust with stochastic frequency decorrelation.

use skyemit_core::{EmissionMaps, Frequencies, RngHandle, SkyError, I, Q, U};
use tracing::debug;

use crate::decorrelation::{check_correlation_length, decorrelation_matrix};
use crate::mbb::{ModifiedBlackBody, ModifiedBlackBodySpec};
use crate::model::EmissionModel;

/// Modified blackbody whose spectral behaviour decorrelates between
/// frequencies.
///
/// Each evaluation draws a constrained Gaussian realization per channel (I,
/// and P shared by Q and U) anchored at the channel's reference frequency and
/// multiplies the resulting per-frequency factor onto the deterministic
/// emission.
#[derive(Debug, Clone)]
pub struct DecorrelatedModifiedBlackBody {
    base: ModifiedBlackBody,
    correlation_length: f64,
}

impl DecorrelatedModifiedBlackBody {
    /// Builds the model. `correlation_length` must be non-negative; zero is
    /// maximal decorrelation and infinity is full correlation.
    pub fn new(spec: ModifiedBlackBodySpec, correlation_length: f64) -> Result<Self, SkyError> {
        check_correlation_length(correlation_length)?;
        Ok(Self {
            base: ModifiedBlackBody::new(spec)?,
            correlation_length,
        })
    }

    /// Wraps an existing deterministic model.
    pub fn from_model(base: ModifiedBlackBody, correlation_length: f64) -> Result<Self, SkyError> {
        check_correlation_length(correlation_length)?;
        Ok(Self {
            base,
            correlation_length,
        })
    }

    /// Correlation length in log-frequency.
    pub fn correlation_length(&self) -> f64 {
        self.correlation_length
    }

    /// The deterministic model underneath.
    pub fn base(&self) -> &ModifiedBlackBody {
        &self.base
    }

    /// Per-frequency decorrelation factors for the I and P channels.
    ///
    /// Draws the I normals first, then the P normals, from `rng`.
    pub fn decorrelation_factors(
        &self,
        freqs: &Frequencies,
        rng: &mut RngHandle,
    ) -> Result<(Vec<f64>, Vec<f64>), SkyError> {
        let [freq_ref_i, freq_ref_p, _] = self.base.reference_frequencies();
        let nfreq = freqs.len();
        let pair_i = decorrelation_matrix(freq_ref_i, freqs.as_ghz(), self.correlation_length)?;
        let pair_p = decorrelation_matrix(freq_ref_p, freqs.as_ghz(), self.correlation_length)?;
        let factors_i = pair_i.realize(&rng.standard_normals(nfreq))?;
        let factors_p = pair_p.realize(&rng.standard_normals(nfreq))?;
        debug!(nfreq, correlation_length = self.correlation_length, "drew decorrelation factors");
        Ok((factors_i, factors_p))
    }

    /// Evaluates the model at `freqs` using `rng` for the decorrelation draw.
    pub fn get_emission(
        &self,
        freqs: &Frequencies,
        rng: &mut RngHandle,
    ) -> Result<EmissionMaps, SkyError> {
        let (factors_i, factors_p) = self.decorrelation_factors(freqs, rng)?;
        let mut maps = self.base.get_emission(freqs)?;
        for (ifreq, (&factor_i, &factor_p)) in factors_i.iter().zip(&factors_p).enumerate() {
            maps.scale_plane(ifreq, I, factor_i);
            maps.scale_plane(ifreq, Q, factor_p);
            maps.scale_plane(ifreq, U, factor_p);
        }
        Ok(maps)
    }
}

impl EmissionModel for DecorrelatedModifiedBlackBody {
    fn name(&self) -> &'static str {
        "decorrelated_modified_blackbody"
    }

    fn npix(&self) -> usize {
        EmissionModel::npix(&self.base)
    }

    fn npol(&self) -> usize {
        3
    }

    fn get_emission(
        &self,
        freqs: &Frequencies,
        rng: &mut RngHandle,
    ) -> Result<EmissionMaps, SkyError> {
        DecorrelatedModifiedBlackBody::get_emission(self, freqs, rng)
    }
}
