//! Deterministic RNG wrapper and seed-derivation helpers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

const SUBSTREAM_TAG: &[u8] = b"skyemit/component";

/// Deterministic RNG handle passed to stochastic emission models.
///
/// A master `seed: u64` must be provided by the caller; there is no implicit
/// global generator. Substreams are derived by hashing a fixed tag and
/// `(master_seed, substream_id)` with SipHash-1-3 under zero keys, so a sky
/// made of several components draws each component from its own
/// reproducible stream.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates the handle for substream `substream` of `master_seed`.
    pub fn substream(master_seed: u64, substream: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, substream))
    }

    /// Draws `len` independent standard normal deviates, in order.
    pub fn standard_normals(&mut self, len: usize) -> Vec<f64> {
        (0..len).map(|_| self.rng.sample(StandardNormal)).collect()
    }

    /// Draws a fresh master seed, e.g. for a nested set of substreams.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}

/// Seed of substream `substream` of `master_seed`: SipHash-1-3 with zero
/// keys over a fixed tag, the master seed and the substream index.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write(SUBSTREAM_TAG);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
