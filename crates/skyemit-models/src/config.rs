//! Declarative sky configuration.
//!
//! A configuration document (JSON or YAML) names a resolution and a list of
//! components. Map and table paths are resolved against a base directory,
//! normally the directory holding the document.
//!
//! ```yaml
//! nside: 1
//! components:
//!   - model: mbb
//!     map_i: dust_i.json
//!     map_q: dust_q.json
//!     map_u: dust_u.json
//!     freq_ref_i: 545 GHz
//!     freq_ref_p: 353 GHz
//!     index: 1.53
//!     temperature: dust_temperature.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skyemit_core::errors::{ErrorInfo, SkyError};
use skyemit_core::serde::{from_document_slice, to_document_bytes};
use skyemit_core::{PixelMap, Quantity, SpectralParam, Unit};
use tracing::info;

use crate::decorrelated::DecorrelatedModifiedBlackBody;
use crate::io::{read_map, read_map_declared, read_table};
use crate::mbb::{ModifiedBlackBody, ModifiedBlackBodySpec};
use crate::model::EmissionModel;
use crate::sky::Sky;
use crate::spdust::{PolarizedSpinningDust, SpinningDust, SpinningDustSpec};

/// A spectral parameter given inline or as a path to a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamSource {
    /// Same value on every pixel. A bare number is taken in the parameter's
    /// natural unit.
    Value(Quantity),
    /// Path to a per-pixel map document.
    Map(PathBuf),
}

impl ParamSource {
    /// Resolves the source to a parameter expressed in `unit`.
    pub fn resolve(
        &self,
        base_dir: &Path,
        nside: usize,
        unit: Unit,
    ) -> Result<SpectralParam, SkyError> {
        match self {
            ParamSource::Value(quantity) if quantity.unit() == Unit::Dimensionless => {
                Ok(SpectralParam::Uniform(quantity.value()))
            }
            ParamSource::Value(quantity) => Ok(SpectralParam::Uniform(quantity.value_in(unit)?)),
            ParamSource::Map(path) => {
                let map = read_map(&base_dir.join(path), nside, Some(unit))?;
                SpectralParam::from_map(map, unit)
            }
        }
    }
}

/// Modified blackbody settings shared by the plain and decorrelated models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MbbConfig {
    /// Intensity template.
    pub map_i: PathBuf,
    /// Stokes Q template.
    pub map_q: PathBuf,
    /// Stokes U template.
    pub map_u: PathBuf,
    /// Unit assumed for templates that do not declare one.
    #[serde(default)]
    pub unit: Option<Unit>,
    /// Reference frequency of `map_i`.
    pub freq_ref_i: Quantity,
    /// Reference frequency of `map_q` and `map_u`.
    pub freq_ref_p: Quantity,
    /// Spectral index.
    pub index: ParamSource,
    /// Dust temperature; bare numbers are kelvin.
    pub temperature: ParamSource,
    /// Correlation length, required by the decorrelated model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_length: Option<f64>,
}

/// Spinning dust settings shared by the unpolarized and polarized models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinningDustConfig {
    /// Intensity template.
    pub map_i: PathBuf,
    /// Unit assumed for templates that do not declare one.
    #[serde(default)]
    pub unit: Option<Unit>,
    /// Reference frequency of `map_i`.
    pub freq_ref_i: Quantity,
    /// Emissivity table, comma separated.
    pub emissivity: PathBuf,
    /// Peak frequency; bare numbers are GHz.
    pub freq_peak: ParamSource,
    /// Peak frequency the emissivity table was computed for.
    #[serde(default = "default_freq_ref_peak")]
    pub freq_ref_peak: Quantity,
    /// Polarization fraction, required by the polarized model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pol_frac: Option<ParamSource>,
    /// Map whose ratio with `angle_u` gives the polarization angle, usually a
    /// Stokes Q template. Read in its declared unit, else `unit`, else
    /// dimensionless.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_q: Option<PathBuf>,
    /// Map whose ratio with `angle_q` gives the polarization angle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_u: Option<PathBuf>,
}

fn default_freq_ref_peak() -> Quantity {
    Quantity::ghz(30.0)
}

/// One component of a [`SkyConfig`], tagged by `model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ComponentConfig {
    /// [`ModifiedBlackBody`].
    Mbb(MbbConfig),
    /// [`DecorrelatedModifiedBlackBody`].
    DecorrelatedMbb(MbbConfig),
    /// [`SpinningDust`].
    Spdust(SpinningDustConfig),
    /// [`PolarizedSpinningDust`].
    SpdustPol(SpinningDustConfig),
}

impl ComponentConfig {
    /// The `model` tag of the component.
    pub fn model(&self) -> &'static str {
        match self {
            ComponentConfig::Mbb(_) => "mbb",
            ComponentConfig::DecorrelatedMbb(_) => "decorrelated_mbb",
            ComponentConfig::Spdust(_) => "spdust",
            ComponentConfig::SpdustPol(_) => "spdust_pol",
        }
    }
}

/// A full sky: resolution plus components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyConfig {
    /// HEALPix resolution of every map.
    pub nside: usize,
    /// Components in evaluation order.
    pub components: Vec<ComponentConfig>,
}

fn missing(model: &str, field: &str) -> SkyError {
    SkyError::InvalidParameter(
        ErrorInfo::new("missing-field", "component configuration lacks a required field")
            .with_context("model", model)
            .with_context("field", field),
    )
}

fn template(
    base_dir: &Path,
    path: &Path,
    nside: usize,
    unit: Option<Unit>,
) -> Result<PixelMap, SkyError> {
    read_map(&base_dir.join(path), nside, unit)
}

fn mbb_spec(
    config: &MbbConfig,
    nside: usize,
    base_dir: &Path,
) -> Result<ModifiedBlackBodySpec, SkyError> {
    Ok(ModifiedBlackBodySpec {
        map_i: template(base_dir, &config.map_i, nside, config.unit)?,
        map_q: template(base_dir, &config.map_q, nside, config.unit)?,
        map_u: template(base_dir, &config.map_u, nside, config.unit)?,
        freq_ref_i: config.freq_ref_i,
        freq_ref_p: config.freq_ref_p,
        index: config.index.resolve(base_dir, nside, Unit::Dimensionless)?,
        temperature: config.temperature.resolve(base_dir, nside, Unit::K)?,
    })
}

fn spdust_spec(
    config: &SpinningDustConfig,
    nside: usize,
    base_dir: &Path,
) -> Result<SpinningDustSpec, SkyError> {
    Ok(SpinningDustSpec {
        map_i: template(base_dir, &config.map_i, nside, config.unit)?,
        freq_ref_i: config.freq_ref_i,
        emissivity: read_table(&base_dir.join(&config.emissivity))?,
        freq_peak: config.freq_peak.resolve(base_dir, nside, Unit::GHz)?,
        freq_ref_peak: config.freq_ref_peak,
    })
}

/// Builds one component, reading its maps relative to `base_dir`.
pub fn build_component(
    config: &ComponentConfig,
    nside: usize,
    base_dir: &Path,
) -> Result<Box<dyn EmissionModel>, SkyError> {
    let component: Box<dyn EmissionModel> = match config {
        ComponentConfig::Mbb(mbb) => {
            Box::new(ModifiedBlackBody::new(mbb_spec(mbb, nside, base_dir)?)?)
        }
        ComponentConfig::DecorrelatedMbb(mbb) => {
            let correlation_length = mbb
                .correlation_length
                .ok_or_else(|| missing(config.model(), "correlation_length"))?;
            Box::new(DecorrelatedModifiedBlackBody::new(
                mbb_spec(mbb, nside, base_dir)?,
                correlation_length,
            )?)
        }
        ComponentConfig::Spdust(spdust) => {
            Box::new(SpinningDust::new(spdust_spec(spdust, nside, base_dir)?)?)
        }
        ComponentConfig::SpdustPol(spdust) => {
            let pol_frac = spdust
                .pol_frac
                .as_ref()
                .ok_or_else(|| missing(config.model(), "pol_frac"))?
                .resolve(base_dir, nside, Unit::Dimensionless)?;
            let angle_q = spdust
                .angle_q
                .as_ref()
                .ok_or_else(|| missing(config.model(), "angle_q"))?;
            let angle_u = spdust
                .angle_u
                .as_ref()
                .ok_or_else(|| missing(config.model(), "angle_u"))?;
            let fallback = spdust.unit.unwrap_or(Unit::Dimensionless);
            Box::new(PolarizedSpinningDust::new(
                spdust_spec(spdust, nside, base_dir)?,
                pol_frac,
                read_map_declared(&base_dir.join(angle_q), nside, fallback)?,
                read_map_declared(&base_dir.join(angle_u), nside, fallback)?,
            )?)
        }
    };
    Ok(component)
}

/// Builds every component of `config` into a [`Sky`].
pub fn build_sky(config: &SkyConfig, base_dir: &Path) -> Result<Sky, SkyError> {
    let mut sky = Sky::new();
    for component in &config.components {
        sky.push(build_component(component, config.nside, base_dir)?)?;
    }
    info!(nside = config.nside, components = sky.len(), "built sky");
    Ok(sky)
}

/// Reads a JSON or YAML configuration document.
pub fn load_sky_config(path: &Path) -> Result<SkyConfig, SkyError> {
    let bytes = fs::read(path).map_err(|err| {
        SkyError::Io(
            ErrorInfo::new("config-read", err.to_string()).with_context("path", path.display()),
        )
    })?;
    from_document_slice(path, &bytes)
}

/// Writes `config` as JSON or YAML according to the extension of `path`.
pub fn save_sky_config(path: &Path, config: &SkyConfig) -> Result<(), SkyError> {
    let bytes = to_document_bytes(path, config)?;
    fs::write(path, bytes).map_err(|err| {
        SkyError::Io(
            ErrorInfo::new("config-write", err.to_string()).with_context("path", path.display()),
        )
    })
}

/// Reads a configuration document and builds it, resolving paths against the
/// document's directory.
pub fn load_sky(path: &Path) -> Result<Sky, SkyError> {
    let config = load_sky_config(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    build_sky(&config, base_dir)
}
