//! Spectral energy distribution primitives.
//!
//! Frequencies are in GHz and temperatures in K throughout.

/// Planck constant over Boltzmann constant, in K / GHz.
pub const H_OVER_K_GHZ: f64 = 6.626_070_15e-34 / 1.380_649e-23 * 1e9;

/// Ratio of the Planck spectral radiance `B_ν(T)` at `freq_to` to that at
/// `freq_from`.
///
/// The `2h/c²` prefactor cancels, leaving `(ν_to/ν_from)³ ·
/// expm1(hν_from/kT) / expm1(hν_to/kT)`. `expm1` keeps the Rayleigh-Jeans end
/// accurate.
#[inline]
pub fn blackbody_ratio(freq_to: f64, freq_from: f64, temp: f64) -> f64 {
    let x_to = H_OVER_K_GHZ * freq_to / temp;
    let x_from = H_OVER_K_GHZ * freq_from / temp;
    (freq_to / freq_from).powi(3) * (x_from.exp_m1() / x_to.exp_m1())
}

/// Modified blackbody scaling factor from `freq_from` to `freq_to`.
///
/// Templates are in Rayleigh-Jeans brightness temperature, hence the fixed
/// `index - 2` power law. Exactly 1 when the frequencies are equal.
#[inline]
pub fn mbb_scaling(freq_to: f64, freq_from: f64, index: f64, temp: f64) -> f64 {
    (freq_to / freq_from).powf(index - 2.0) * blackbody_ratio(freq_to, freq_from, temp)
}
