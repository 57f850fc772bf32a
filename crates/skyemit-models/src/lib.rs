#![deny(missing_docs)]
#![doc = "Galactic dust emission models: modified blackbody thermal dust, its frequency-decorrelated variant and spinning dust, plus the readers and configuration layer that assemble them into a sky."]

pub mod config;
pub mod decorrelated;
pub mod decorrelation;
pub mod interp;
pub mod io;
pub mod linalg;
pub mod mbb;
pub mod model;
pub mod sed;
pub mod sky;
pub mod spdust;

pub use config::{
    build_component, build_sky, load_sky, load_sky_config, save_sky_config, ComponentConfig,
    MbbConfig, ParamSource, SkyConfig, SpinningDustConfig,
};
pub use decorrelated::DecorrelatedModifiedBlackBody;
pub use decorrelation::{decorrelation_matrix, frequency_correlation, CovariancePair};
pub use interp::EmissivityCurve;
pub use io::{read_map, read_map_declared, read_map_field, read_table};
pub use linalg::safe_invert;
pub use mbb::{ModifiedBlackBody, ModifiedBlackBodySpec};
pub use model::EmissionModel;
pub use sed::{blackbody_ratio, mbb_scaling};
pub use sky::Sky;
pub use spdust::{PolarizedSpinningDust, SpinningDust, SpinningDustSpec};
