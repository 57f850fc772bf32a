use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skyemit_core::{Frequencies, PixelMap, Quantity, RngHandle, SpectralParam, Unit};
use skyemit_models::{
    decorrelation_matrix, DecorrelatedModifiedBlackBody, EmissivityCurve, ModifiedBlackBody,
    ModifiedBlackBodySpec, SpinningDust, SpinningDustSpec,
};

const NPIX: usize = 12 * 64 * 64;

fn dust_spec() -> ModifiedBlackBodySpec {
    let ramp: Vec<f64> = (0..NPIX).map(|pix| 50.0 + (pix % 97) as f64).collect();
    ModifiedBlackBodySpec {
        map_i: PixelMap::new(ramp.clone(), Unit::UKRj),
        map_q: PixelMap::new(ramp.iter().map(|v| 0.1 * v).collect(), Unit::UKRj),
        map_u: PixelMap::new(ramp.iter().map(|v| -0.05 * v).collect(), Unit::UKRj),
        freq_ref_i: Quantity::ghz(545.0),
        freq_ref_p: Quantity::ghz(353.0),
        index: SpectralParam::PerPixel(
            (0..NPIX).map(|pix| 1.4 + 0.001 * (pix % 200) as f64).collect(),
        ),
        temperature: SpectralParam::Uniform(19.6),
    }
}

fn bench_emission(c: &mut Criterion) {
    let freqs =
        Frequencies::from_ghz(&[30.0, 44.0, 70.0, 100.0, 143.0, 217.0, 353.0, 545.0]).unwrap();

    let mbb = ModifiedBlackBody::new(dust_spec()).unwrap();
    c.bench_function("mbb_8freq_nside64", |b| {
        b.iter(|| black_box(mbb.get_emission(&freqs).unwrap()))
    });

    let decorrelated = DecorrelatedModifiedBlackBody::new(dust_spec(), 1.0).unwrap();
    c.bench_function("decorrelated_mbb_8freq_nside64", |b| {
        let mut rng = RngHandle::from_seed(7);
        b.iter(|| black_box(decorrelated.get_emission(&freqs, &mut rng).unwrap()))
    });

    let curve: Vec<(f64, f64)> = (1..400)
        .map(|i| {
            let freq = 0.25 * i as f64;
            (freq, (-((freq - 30.0) / 10.0).powi(2)).exp())
        })
        .collect();
    let spdust = SpinningDust::new(SpinningDustSpec {
        map_i: PixelMap::filled(NPIX, 30.0, Unit::UKRj),
        freq_ref_i: Quantity::ghz(22.8),
        emissivity: EmissivityCurve::new(&curve).unwrap(),
        freq_peak: SpectralParam::Uniform(25.0),
        freq_ref_peak: Quantity::ghz(30.0),
    })
    .unwrap();
    c.bench_function("spdust_8freq_nside64", |b| {
        b.iter(|| black_box(spdust.get_emission(&freqs).unwrap()))
    });
}

fn bench_decorrelation_matrix(c: &mut Criterion) {
    let freqs: Vec<f64> = (0..64).map(|i| 20.0 * 1.05f64.powi(i)).collect();
    c.bench_function("decorrelation_matrix_64", |b| {
        b.iter(|| black_box(decorrelation_matrix(353.0, &freqs, 1.0).unwrap()))
    });
}

criterion_group!(benches, bench_emission, bench_decorrelation_matrix);
criterion_main!(benches);
