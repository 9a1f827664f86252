use appraise::{
    api::build_state,
    config::AppConfig,
    domain::{CurrencyPolicy, FeatureVector, Price},
    services::PredictionService,
    AppraiseError,
};
use std::path::Path;

fn repo_config() -> AppConfig {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut config = AppConfig::load_from(root.join("config")).expect("config should load");
    config.model.path = root.join(&config.model.path).to_string_lossy().to_string();
    config
}

#[test]
fn repo_config_is_valid() {
    let config = repo_config();
    assert!(config.validate().is_ok());
    assert_eq!(config.server.port, 10000);
}

#[test]
fn shipped_model_scores_reference_sample() {
    let state = build_state(&repo_config()).expect("shipped model should load");

    let prediction = state
        .predictor
        .predict(&FeatureVector::REFERENCE)
        .expect("reference sample should score");

    // California housing OLS puts this block at roughly $413k.
    assert!(
        (4.0..4.3).contains(&prediction.raw),
        "unexpected raw prediction {}",
        prediction.raw
    );
    assert_eq!(prediction.price, Price::Raw(prediction.raw));
    assert!(PredictionService::render_form_output(&prediction).starts_with("Predicted Price: 4."));
}

#[test]
fn inr_deployment_reuses_the_same_raw_output() {
    let raw_state = build_state(&repo_config()).unwrap();
    let mut inr_config = repo_config();
    inr_config.pricing.policy = CurrencyPolicy::Inr;
    let inr_state = build_state(&inr_config).unwrap();

    let raw = raw_state
        .predictor
        .predict(&FeatureVector::REFERENCE)
        .unwrap()
        .raw;
    let inr = inr_state
        .predictor
        .predict(&FeatureVector::REFERENCE)
        .unwrap();

    assert_eq!(inr.raw, raw);
    assert_eq!(inr.price, Price::Inr((raw * 100000.0 * 85.0).trunc() as i64));
}

#[test]
fn missing_model_refuses_to_build() {
    let mut config = repo_config();
    config.model.path = "does/not/exist.json".to_string();

    let err = build_state(&config).err().expect("build should fail");
    assert!(matches!(err, AppraiseError::ModelUnavailable { .. }));
}
