use proptest::prelude::*;
use skyemit_core::{Frequencies, PixelMap, Quantity, SkyError, Unit};

#[test]
fn scalar_frequency_becomes_single_element() {
    let freqs = Frequencies::scalar(Quantity::new(1500.0, Unit::MHz)).unwrap();
    assert_eq!(freqs.len(), 1);
    assert!((freqs.as_ghz()[0] - 1.5).abs() < 1e-12);
}

#[test]
fn empty_and_non_positive_inputs_are_rejected() {
    let err = Frequencies::from_ghz(&[]).unwrap_err();
    assert!(matches!(err, SkyError::InvalidFrequencyInput(_)));

    let err = Frequencies::from_ghz(&[30.0, 0.0]).unwrap_err();
    assert!(matches!(err, SkyError::InvalidFrequencyInput(_)));
    assert_eq!(err.info().context.get("index").map(String::as_str), Some("1"));

    let err = Frequencies::from_ghz(&[-10.0]).unwrap_err();
    assert!(matches!(err, SkyError::InvalidFrequencyInput(_)));

    let err = Frequencies::from_ghz(&[f64::NAN]).unwrap_err();
    assert!(matches!(err, SkyError::InvalidFrequencyInput(_)));
}

#[test]
fn non_frequency_units_are_unit_mismatch() {
    let err = Frequencies::new(&[20.0], Unit::K).unwrap_err();
    assert!(matches!(err, SkyError::UnitMismatch(_)));
}

#[test]
fn mixed_units_normalise_to_ghz() {
    let freqs: Frequencies = "30 GHz, 100000 MHz, 0.353 THz".parse().unwrap();
    let ghz = freqs.as_ghz();
    assert_eq!(ghz.len(), 3);
    assert!((ghz[0] - 30.0).abs() < 1e-12);
    assert!((ghz[1] - 100.0).abs() < 1e-9);
    assert!((ghz[2] - 353.0).abs() < 1e-9);
}

#[test]
fn frequencies_deserialize_from_quantity_strings() {
    let freqs: Frequencies = serde_json::from_str(r#"["23 GHz", "33 GHz"]"#).unwrap();
    assert_eq!(freqs.as_ghz(), &[23.0, 33.0]);
    let err = serde_json::from_str::<Frequencies>("[]");
    assert!(err.is_err());
}

#[test]
fn pixel_map_unit_conversion_scales_values() {
    let map = PixelMap::new(vec![1.0, 2.5], Unit::MKRj);
    let converted = map.into_unit(Unit::UKRj).unwrap();
    assert_eq!(converted.unit(), Unit::UKRj);
    assert_eq!(converted.values(), &[1000.0, 2500.0]);

    let err = PixelMap::new(vec![1.0], Unit::K).into_unit(Unit::UKRj).unwrap_err();
    assert!(matches!(err, SkyError::UnitMismatch(_)));
}

proptest! {
    #[test]
    fn positive_frequencies_preserve_order(
        values in proptest::collection::vec(1e-3f64..1e4, 1..16),
    ) {
        let freqs = Frequencies::from_ghz(&values).unwrap();
        prop_assert_eq!(freqs.as_ghz(), values.as_slice());
    }
}
