//! The evaluation contract shared by every emission component.

use rayon::prelude::*;
use skyemit_core::{EmissionMaps, Frequencies, RngHandle, SkyError, Unit};

/// A sky component that can be evaluated at arbitrary frequencies.
///
/// Deterministic components ignore `rng`; stochastic ones draw from it, so a
/// fixed seed reproduces the output exactly.
pub trait EmissionModel: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Number of pixels of every map the component produces.
    fn npix(&self) -> usize;

    /// Number of polarization channels in the output (1 or 3).
    fn npol(&self) -> usize;

    /// Evaluates the component, returning maps shaped `(nfreq, npol, npix)`.
    fn get_emission(
        &self,
        freqs: &Frequencies,
        rng: &mut RngHandle,
    ) -> Result<EmissionMaps, SkyError>;
}

/// Allocates the output buffer and fills one frequency slab per task.
///
/// `fill` receives the frequency in GHz and the `npol * npix` slab for it,
/// laid out polarization-major.
pub(crate) fn evaluate_per_frequency<F>(
    freqs: &Frequencies,
    npol: usize,
    npix: usize,
    fill: F,
) -> EmissionMaps
where
    F: Fn(f64, &mut [f64]) + Sync,
{
    let mut maps = EmissionMaps::zeros(freqs.len(), npol, npix, Unit::UKRj);
    let slab_len = maps.slab_len();
    if slab_len == 0 {
        return maps;
    }
    maps.as_mut_slice()
        .par_chunks_mut(slab_len)
        .zip(freqs.as_ghz().par_iter())
        .for_each(|(slab, &freq)| fill(freq, slab));
    maps
}
