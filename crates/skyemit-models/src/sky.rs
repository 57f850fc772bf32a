//! Aggregation of several components into one sky.

use skyemit_core::errors::{ErrorInfo, SkyError};
use skyemit_core::{EmissionMaps, Frequencies, RngHandle, Unit, I};
use tracing::{debug, info_span};

use crate::model::EmissionModel;

/// An ordered collection of emission components sharing one pixelization.
///
/// Component `k` is evaluated with the substream `k` of the master seed, so
/// adding a component never perturbs the draws of the ones before it.
#[derive(Default)]
pub struct Sky {
    components: Vec<Box<dyn EmissionModel>>,
}

impl Sky {
    /// Creates an empty sky.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a sky from components, checking that their pixel counts agree.
    pub fn from_components(components: Vec<Box<dyn EmissionModel>>) -> Result<Self, SkyError> {
        let mut sky = Self::new();
        for component in components {
            sky.push(component)?;
        }
        Ok(sky)
    }

    /// Appends a component.
    pub fn push(&mut self, component: Box<dyn EmissionModel>) -> Result<(), SkyError> {
        if let Some(npix) = self.npix() {
            if component.npix() != npix {
                return Err(SkyError::ShapeMismatch(
                    ErrorInfo::new("component-npix", "component pixel count differs from the sky")
                        .with_context("component", component.name())
                        .with_context("expected", npix)
                        .with_context("found", component.npix()),
                ));
            }
        }
        if !matches!(component.npol(), 1 | 3) {
            return Err(SkyError::InvalidParameter(
                ErrorInfo::new("component-npol", "components must produce 1 or 3 channels")
                    .with_context("component", component.name())
                    .with_context("npol", component.npol()),
            ));
        }
        self.components.push(component);
        Ok(())
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the sky has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Pixel count shared by the components, `None` for an empty sky.
    pub fn npix(&self) -> Option<usize> {
        self.components.first().map(|component| component.npix())
    }

    /// Names of the components in evaluation order.
    pub fn component_names(&self) -> Vec<&'static str> {
        self.components.iter().map(|component| component.name()).collect()
    }

    /// Sums the emission of every component at `freqs` into `(nfreq, 3, npix)`
    /// maps in uK_RJ. Single-channel components contribute to I only.
    pub fn get_emission(&self, freqs: &Frequencies, seed: u64) -> Result<EmissionMaps, SkyError> {
        let npix = self.npix().unwrap_or(0);
        let mut total = EmissionMaps::zeros(freqs.len(), 3, npix, Unit::UKRj);
        for (index, component) in self.components.iter().enumerate() {
            let span = info_span!("component", name = component.name(), index);
            let _guard = span.enter();
            let mut rng = RngHandle::substream(seed, index as u64);
            let maps = component.get_emission(freqs, &mut rng)?;
            accumulate(&mut total, &maps)?;
            debug!(nfreq = freqs.len(), npol = maps.npol(), "accumulated component");
        }
        Ok(total)
    }
}

fn accumulate(total: &mut EmissionMaps, maps: &EmissionMaps) -> Result<(), SkyError> {
    if maps.nfreq() != total.nfreq() {
        return Err(SkyError::shape_mismatch("component nfreq", total.nfreq(), maps.nfreq()));
    }
    if maps.npix() != total.npix() {
        return Err(SkyError::shape_mismatch("component npix", total.npix(), maps.npix()));
    }
    let factor = maps.unit().conversion_factor(total.unit())?;
    for freq in 0..maps.nfreq() {
        for pol in 0..maps.npol() {
            let target = if maps.npol() == 1 { I } else { pol };
            let source = maps.plane(freq, pol);
            for (out, value) in total.plane_mut(freq, target).iter_mut().zip(source) {
                *out += factor * value;
            }
        }
    }
    Ok(())
}

impl EmissionModel for Sky {
    fn name(&self) -> &'static str {
        "sky"
    }

    fn npix(&self) -> usize {
        Sky::npix(self).unwrap_or(0)
    }

    fn npol(&self) -> usize {
        3
    }

    /// Draws a master seed from `rng` and evaluates every component on its
    /// own substream of it.
    fn get_emission(
        &self,
        freqs: &Frequencies,
        rng: &mut RngHandle,
    ) -> Result<EmissionMaps, SkyError> {
        let seed = rng.next_seed();
        Sky::get_emission(self, freqs, seed)
    }
}
