use oca_core::common::constants::LASER_WAVELENGTHS;
use oca_core::modules::absorption::{AbsorptionFormula, AttenuationLength};
use oca_core::numerics::approx_eq;

const COEFFICIENTS: [f64; 5] = [4.0e-5, 3.5e-5, 3.2e-5, 2.8e-5, 2.0e-5];
const SCATTERING: [f64; 5] = [60000.0, 90000.0, 110000.0, 150000.0, 320000.0];

// A = L*S / (S - 0.77 L) with L = 1/c, evaluated by hand.
const EXPECTED: [f64; 5] = [
    36809.815950920245,
    37815.12605042017,
    40000.0,
    43731.77842565598,
    56838.36589698045,
];

fn attenuation(index: usize) -> AttenuationLength {
    AttenuationLength::from_coefficient(LASER_WAVELENGTHS[index], COEFFICIENTS[index], 0.0, 0.0)
        .expect("coefficient is positive")
}

#[test]
fn ratio_formula_matches_hand_evaluated_lengths() {
    let formula = AbsorptionFormula::RatioCombination { factor: 0.77 };
    for index in 0..LASER_WAVELENGTHS.len() {
        let (length, error) = formula
            .absorption_length(&attenuation(index), SCATTERING[index])
            .expect("denominator is well away from zero");
        assert!(
            approx_eq(length, EXPECTED[index], 0.0, 1.0e-12),
            "{} nm: {length} != {}",
            LASER_WAVELENGTHS[index],
            EXPECTED[index]
        );
        assert_eq!(error, 0.0);
    }
}

#[test]
fn reciprocal_formula_agrees_with_ratio_formula() {
    let formula = AbsorptionFormula::ReciprocalSubtraction { factor: 0.77 };
    for index in 0..LASER_WAVELENGTHS.len() {
        let (length, error) = formula
            .absorption_length(&attenuation(index), SCATTERING[index])
            .expect("denominator is well away from zero");
        assert!(approx_eq(length, EXPECTED[index], 0.0, 1.0e-12));
        assert_eq!(error, 0.0);
    }
}

#[test]
fn vanishing_denominator_is_a_computation_error() {
    // 0.77 * L equals S exactly
    let attenuation = AttenuationLength::from_coefficient(337.0, 1.0 / 1000.0, 0.0, 0.0).unwrap();
    let error = AbsorptionFormula::RatioCombination { factor: 0.77 }
        .absorption_length(&attenuation, 770.0)
        .expect_err("cancellation should be reported");

    assert_eq!(error.placeholder(), "RUN.ABSORPTION_DENOMINATOR");
    assert_eq!(error.exit_code(), 4);
}

#[test]
fn reciprocal_formula_reports_vanishing_denominator() {
    // c equals 0.77 / S exactly
    let attenuation = AttenuationLength::from_coefficient(337.0, 1.0 / 1000.0, 0.0, 0.0).unwrap();
    let error = AbsorptionFormula::ReciprocalSubtraction { factor: 0.77 }
        .absorption_length(&attenuation, 770.0)
        .expect_err("cancellation should be reported");

    assert_eq!(error.placeholder(), "RUN.ABSORPTION_DENOMINATOR");
    assert_eq!(error.exit_code(), 4);
}

#[test]
fn attenuation_error_scales_with_length_squared() {
    let attenuation = AttenuationLength::from_coefficient(420.0, 2.0e-5, 1.0e-7, 1.0e-7).unwrap();
    assert!(approx_eq(attenuation.length, 50000.0, 0.0, 1.0e-12));
    assert!(approx_eq(attenuation.error, 500.0, 0.0, 1.0e-12));
}
