use skyemit_core::{
    Frequencies, PixelMap, Quantity, RngHandle, SkyError, SpectralParam, Unit, I, Q, U,
};
use skyemit_models::{
    DecorrelatedModifiedBlackBody, EmissionModel, EmissivityCurve, ModifiedBlackBody,
    ModifiedBlackBodySpec, Sky, SpinningDust, SpinningDustSpec,
};

fn dust(npix: usize) -> ModifiedBlackBodySpec {
    ModifiedBlackBodySpec {
        map_i: PixelMap::filled(npix, 100.0, Unit::UKRj),
        map_q: PixelMap::filled(npix, 10.0, Unit::UKRj),
        map_u: PixelMap::filled(npix, 1.0, Unit::UKRj),
        freq_ref_i: Quantity::ghz(353.0),
        freq_ref_p: Quantity::ghz(353.0),
        index: SpectralParam::Uniform(1.5),
        temperature: SpectralParam::Uniform(20.0),
    }
}

fn ame(npix: usize) -> SpinningDust {
    SpinningDust::new(SpinningDustSpec {
        map_i: PixelMap::filled(npix, 7.0, Unit::UKRj),
        freq_ref_i: Quantity::ghz(353.0),
        emissivity: EmissivityCurve::new(&[(1.0, 1.0), (1000.0, 1.0)]).unwrap(),
        freq_peak: SpectralParam::Uniform(30.0),
        freq_ref_peak: Quantity::ghz(30.0),
    })
    .unwrap()
}

fn boxed(model: impl EmissionModel + 'static) -> Box<dyn EmissionModel> {
    Box::new(model)
}

#[test]
fn single_channel_components_add_to_intensity_only() {
    let mut sky = Sky::new();
    sky.push(Box::new(ModifiedBlackBody::new(dust(4)).unwrap())).unwrap();
    sky.push(Box::new(ame(4))).unwrap();
    assert_eq!(sky.len(), 2);

    let maps = sky.get_emission(&Frequencies::from_ghz(&[353.0]).unwrap(), 0).unwrap();
    for pix in 0..4 {
        assert_eq!(maps.get(0, I, pix), 107.0);
        assert_eq!(maps.get(0, Q, pix), 10.0);
        assert_eq!(maps.get(0, U, pix), 1.0);
    }
}

#[test]
fn mismatched_pixel_counts_are_rejected() {
    let mut sky = Sky::new();
    sky.push(Box::new(ModifiedBlackBody::new(dust(4)).unwrap())).unwrap();
    let err = sky.push(Box::new(ame(5))).unwrap_err();
    assert!(matches!(err, SkyError::ShapeMismatch(_)));
    assert_eq!(sky.len(), 1);
}

#[test]
fn components_draw_from_independent_substreams() {
    let stochastic = || -> Box<dyn EmissionModel> {
        Box::new(DecorrelatedModifiedBlackBody::new(dust(2), 1.0).unwrap())
    };
    let freqs = Frequencies::from_ghz(&[30.0, 100.0]).unwrap();

    let alone = Sky::from_components(vec![stochastic()]).unwrap();
    let with_prefix = Sky::from_components(vec![boxed(ame(2)), stochastic()]).unwrap();
    let with_suffix = Sky::from_components(vec![stochastic(), boxed(ame(2))]).unwrap();

    let base = alone.get_emission(&freqs, 77).unwrap();
    let suffixed = with_suffix.get_emission(&freqs, 77).unwrap();
    let prefixed = with_prefix.get_emission(&freqs, 77).unwrap();
    // appending keeps the draws of earlier components
    assert_eq!(base.plane(0, Q), suffixed.plane(0, Q));
    // the stochastic component moved to substream 1
    assert_ne!(base.plane(0, Q), prefixed.plane(0, Q));
}

#[test]
fn sky_is_itself_an_emission_model() {
    let sky = Sky::from_components(vec![boxed(ame(3))]).unwrap();
    let freqs = Frequencies::from_ghz(&[353.0]).unwrap();
    let maps = EmissionModel::get_emission(&sky, &freqs, &mut RngHandle::from_seed(1)).unwrap();
    assert_eq!(EmissionModel::npol(&sky), 3);
    assert_eq!(maps.get(0, I, 2), 7.0);
    assert_eq!(maps.get(0, Q, 2), 0.0);
}

#[test]
fn nested_sky_draws_its_master_seed_from_the_caller() {
    let sky = Sky::from_components(vec![Box::new(
        DecorrelatedModifiedBlackBody::new(dust(2), 1.0).unwrap(),
    )])
    .unwrap();
    let freqs = Frequencies::from_ghz(&[30.0, 100.0]).unwrap();

    let seed = RngHandle::from_seed(9).next_seed();
    let direct = sky.get_emission(&freqs, seed).unwrap();
    let nested = EmissionModel::get_emission(&sky, &freqs, &mut RngHandle::from_seed(9)).unwrap();
    assert_eq!(direct, nested);

    let other = EmissionModel::get_emission(&sky, &freqs, &mut RngHandle::from_seed(10)).unwrap();
    assert_ne!(direct.plane(0, Q), other.plane(0, Q));
}

#[test]
fn empty_sky_produces_empty_maps() {
    let sky = Sky::new();
    assert!(sky.is_empty());
    let maps = sky.get_emission(&Frequencies::from_ghz(&[30.0]).unwrap(), 0).unwrap();
    assert_eq!((maps.nfreq(), maps.npol(), maps.npix()), (1, 3, 0));
}
