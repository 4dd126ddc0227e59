//! Integration tests for the Space tag and linear-algebra configuration.

use prism_core::{LinalgConfig, MatrixArray, MatrixArrayError, Space};

// ---------------------------------------------------------------------------
// Space
// ---------------------------------------------------------------------------

#[test]
fn space_default_is_real() {
    assert_eq!(Space::default(), Space::Real);
}

#[test]
fn space_from_str_is_case_insensitive() {
    assert_eq!("real".parse::<Space>().unwrap(), Space::Real);
    assert_eq!("Fourier".parse::<Space>().unwrap(), Space::Fourier);
    assert!("k-space".parse::<Space>().is_err());
}

#[test]
fn space_serializes_snake_case() {
    let json = serde_json::to_string(&Space::Fourier).unwrap();
    assert_eq!(json, "\"fourier\"");
    let back: Space = serde_json::from_str("\"real\"").unwrap();
    assert_eq!(back, Space::Real);
}

#[test]
fn space_mismatch_message_names_both_spaces() {
    let err = MatrixArrayError::SpaceMismatch {
        left: Space::Real,
        right: Space::Fourier,
    };
    let msg = err.to_string();
    assert!(msg.contains("non-matching spaces"));
    assert!(msg.contains("Real"));
    assert!(msg.contains("Fourier"));
}

// ---------------------------------------------------------------------------
// LinalgConfig
// ---------------------------------------------------------------------------

#[test]
fn linalg_config_default_is_valid() {
    let cfg = LinalgConfig::default();
    assert!(cfg.validate().is_ok());
    // Only exactly singular slices fail unless a relative threshold is requested.
    assert_eq!(cfg.pivot_tolerance, 0.0);
}

#[test]
fn linalg_config_rejects_bad_tolerance() {
    assert!(LinalgConfig::new(-1.0).is_err());
    assert!(LinalgConfig::new(f64::NAN).is_err());
    assert!(LinalgConfig::new(0.0).is_ok());
}

#[test]
fn linalg_config_round_trips_json() {
    let cfg = LinalgConfig::new(1e-8).unwrap();
    let json = serde_json::to_string(&cfg).unwrap();
    assert!(json.contains("pivot_tolerance"));
    let cfg2: LinalgConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(cfg, cfg2);
}

#[test]
fn pivot_tolerance_controls_near_singular_slices() {
    let mut a = MatrixArray::identity(2, 2, Space::Real);
    a.data_mut()[[1, 1, 1]] = 1e-9;

    assert!(a.invert_with(&LinalgConfig::new(1e-12).unwrap()).is_ok());
    assert_eq!(
        a.invert_with(&LinalgConfig::new(1e-6).unwrap()).unwrap_err(),
        MatrixArrayError::SingularMatrix { index: 1 }
    );
}

#[test]
fn invalid_config_is_reported_by_invert() {
    let mut a = MatrixArray::identity(1, 2, Space::Real);
    let cfg = LinalgConfig {
        pivot_tolerance: -0.5,
    };
    assert!(matches!(
        a.invert_inplace_with(&cfg).unwrap_err(),
        MatrixArrayError::InvalidConfig(_)
    ));
}
