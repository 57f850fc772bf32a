#![deny(missing_docs)]
#![doc = "Core types for the skyemit foreground emission models: unit-tagged quantities, validated frequencies, pixel maps, the emission output buffer, deterministic RNG handles and the shared error surface."]

pub mod errors;
pub mod freq;
pub mod maps;
pub mod rng;
pub mod serde;
pub mod units;

pub use errors::{ErrorInfo, SkyError};
pub use freq::Frequencies;
pub use maps::{npix_for_nside, EmissionMaps, PixelMap, SpectralParam};
pub use rng::{derive_substream_seed, RngHandle};
pub use units::{Dimension, Quantity, Temperature, Unit};

/// Polarization channel index of intensity.
pub const I: usize = 0;
/// Polarization channel index of Stokes Q.
pub const Q: usize = 1;
/// Polarization channel index of Stokes U.
pub const U: usize = 2;
