use skyemit_core::{
    Frequencies, PixelMap, Quantity, RngHandle, SkyError, SpectralParam, Unit, I, Q, U,
};
use skyemit_models::{
    DecorrelatedModifiedBlackBody, EmissionModel, ModifiedBlackBody, ModifiedBlackBodySpec,
};

const FREQS: [f64; 3] = [30.0, 70.0, 143.0];

fn spec() -> ModifiedBlackBodySpec {
    ModifiedBlackBodySpec {
        map_i: PixelMap::new(vec![100.0, 200.0], Unit::UKRj),
        map_q: PixelMap::new(vec![10.0, 20.0], Unit::UKRj),
        map_u: PixelMap::new(vec![-10.0, 5.0], Unit::UKRj),
        freq_ref_i: Quantity::ghz(353.0),
        freq_ref_p: Quantity::ghz(353.0),
        index: SpectralParam::Uniform(1.5),
        temperature: SpectralParam::Uniform(20.0),
    }
}

fn model(correlation_length: f64) -> DecorrelatedModifiedBlackBody {
    DecorrelatedModifiedBlackBody::new(spec(), correlation_length).unwrap()
}

fn freqs() -> Frequencies {
    Frequencies::from_ghz(&FREQS).unwrap()
}

#[test]
fn same_seed_is_bit_identical() {
    let model = model(1.0);
    let a = model.get_emission(&freqs(), &mut RngHandle::from_seed(42)).unwrap();
    let b = model.get_emission(&freqs(), &mut RngHandle::from_seed(42)).unwrap();
    assert_eq!(a.as_slice(), b.as_slice());
}

#[test]
fn different_seeds_differ() {
    let model = model(1.0);
    let a = model.get_emission(&freqs(), &mut RngHandle::from_seed(1)).unwrap();
    let b = model.get_emission(&freqs(), &mut RngHandle::from_seed(2)).unwrap();
    assert_ne!(a.as_slice(), b.as_slice());
}

#[test]
fn factors_multiply_the_deterministic_emission() {
    let model = model(1.0);
    let (factors_i, factors_p) = model
        .decorrelation_factors(&freqs(), &mut RngHandle::from_seed(7))
        .unwrap();
    let maps = model.get_emission(&freqs(), &mut RngHandle::from_seed(7)).unwrap();
    let base = model.base().get_emission(&freqs()).unwrap();
    for ifreq in 0..FREQS.len() {
        for pix in 0..2 {
            assert_eq!(maps.get(ifreq, I, pix), base.get(ifreq, I, pix) * factors_i[ifreq]);
            assert_eq!(maps.get(ifreq, Q, pix), base.get(ifreq, Q, pix) * factors_p[ifreq]);
            assert_eq!(maps.get(ifreq, U, pix), base.get(ifreq, U, pix) * factors_p[ifreq]);
        }
    }
}

#[test]
fn factors_average_to_the_conditional_mean() {
    let model = model(1.0);
    let expected = [0.047893295589591246, 0.2701121556734509, 0.6648009219615133];
    let draws = 4000;
    let mut sums = [0.0; 3];
    let mut rng = RngHandle::from_seed(2024);
    for _ in 0..draws {
        let (factors_i, _) = model.decorrelation_factors(&freqs(), &mut rng).unwrap();
        for (sum, factor) in sums.iter_mut().zip(&factors_i) {
            *sum += factor;
        }
    }
    for (sum, expected) in sums.iter().zip(expected) {
        let mean = sum / draws as f64;
        assert!((mean - expected).abs() < 0.06, "{mean} vs {expected}");
    }
}

#[test]
fn infinite_correlation_length_is_allowed() {
    let model = model(f64::INFINITY);
    let maps = model.get_emission(&freqs(), &mut RngHandle::from_seed(3)).unwrap();
    assert!(maps.as_slice().iter().all(|value| value.is_finite()));
}

#[test]
fn reference_frequency_in_the_request_stays_finite() {
    let model = model(1.0);
    let freqs = Frequencies::from_ghz(&[30.0, 353.0, 143.0]).unwrap();
    let maps = model.get_emission(&freqs, &mut RngHandle::from_seed(9)).unwrap();
    assert!(maps.as_slice().iter().all(|value| value.is_finite()));
}

#[test]
fn negative_correlation_length_is_rejected() {
    let err = DecorrelatedModifiedBlackBody::new(spec(), -0.5).unwrap_err();
    assert!(matches!(err, SkyError::InvalidParameter(_)));
    let base = ModifiedBlackBody::new(spec()).unwrap();
    assert!(DecorrelatedModifiedBlackBody::from_model(base, f64::NAN).is_err());
}

#[test]
fn trait_evaluation_consumes_the_passed_rng() {
    let model = model(0.5);
    let mut rng = RngHandle::from_seed(11);
    let first = EmissionModel::get_emission(&model, &freqs(), &mut rng).unwrap();
    let second = EmissionModel::get_emission(&model, &freqs(), &mut rng).unwrap();
    assert_ne!(first.as_slice(), second.as_slice());
    assert_eq!(EmissionModel::name(&model), "decorrelated_modified_blackbody");
}
