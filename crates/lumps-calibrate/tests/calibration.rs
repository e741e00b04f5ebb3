use approx::assert_abs_diff_eq;
use chrono::{Duration, TimeZone, Utc};
use lumps_calibrate::calibration::initial_configuration;
use lumps_calibrate::{get_best_model_output, run_experiment, CalibrationResult, Error, OutputDirectory};
use lumps_components::model::ModelConfiguration;
use lumps_core::config::{ExperimentConfig, PenmanMonteithParams};
use lumps_core::errors::LumpsError;
use lumps_core::surface::{MaterialCoefficients, SurfaceComposition};
use lumps_core::timeseries::EnergyBalanceSeries;
use ndarray::Array1;
use std::fs;
use tempfile::tempdir;

const CONFIG: &str = r#"
active_experiment = "tuned"

[experiments.tuned]
tuning_iterations = 3

[experiments.tuned.penman_monteith_params.tuning_params]
alpha = [0.0, 1.5]
beta = [0.0, 30.0]
number = 7

[experiments.tuned.surface_materials_tuning_params]
a1 = { range = [0.0, 0.5], number = 3 }
a2 = { range = [0.0, 0.2], number = 3 }
a3 = { range = [-20.0, 0.0], number = 3 }

[experiments.tuned.surface_materials_mapping]
Lawn = "grass"

[experiments.fixed]
longwave_model = "burridge_gadd"

[experiments.fixed.penman_monteith_params]
alpha = 0.75
beta = 10.0

[experiments.fixed.surface_materials_mapping]
Lawn = "grass"

[surface_materials.grass]
a1 = 0.25
a2 = 0.1
a3 = -10.0
"#;

fn truth() -> ModelConfiguration {
    ModelConfiguration::new(
        SurfaceComposition::learned(MaterialCoefficients::new(0.25, 0.1, -10.0)),
        PenmanMonteithParams::new(0.75, 10.0),
    )
}

/// A summer day of half-hourly observations whose turbulent fluxes were
/// produced by the model with known parameters.
fn observations() -> EnergyBalanceSeries {
    let n = 24;
    let t0 = Utc.with_ymd_and_hms(2005, 8, 20, 13, 0, 0).unwrap();
    let time = (0..n).map(|i| t0 + Duration::minutes(30 * i as i64)).collect();
    let net: Array1<f64> = (0..n)
        .map(|i| 650.0 * (std::f64::consts::PI * (i as f64 + 0.5) / n as f64).sin() - 40.0)
        .collect();

    let base = EnergyBalanceSeries::new(time)
        .with_column("net_radiation", net)
        .unwrap()
        .with_column("sensible_heat", Array1::zeros(n))
        .unwrap()
        .with_column("latent_heat", Array1::zeros(n))
        .unwrap()
        .with_column("temperature", Array1::linspace(15.0, 27.0, n))
        .unwrap()
        .with_column("pressure", Array1::linspace(1013.0, 1009.0, n))
        .unwrap();

    let modelled = truth().build().run(&base).unwrap();
    let mut observed = base;
    observed
        .insert_column("sensible_heat", modelled.column("model_sensible").unwrap().clone())
        .unwrap();
    observed
        .insert_column("latent_heat", modelled.column("model_latent").unwrap().clone())
        .unwrap();
    observed
}

fn fractions() -> Vec<(String, f64)> {
    vec![("Lawn".to_string(), 0.6), ("Unmapped".to_string(), 0.4)]
}

#[test]
fn test_tuned_experiment_recovers_parameters() {
    let dir = tempdir().unwrap();
    let mut config = ExperimentConfig::from_toml_str(CONFIG).unwrap();
    config.output_dir = dir.path().join("tuned");

    let output = run_experiment(&config, &fractions(), &observations()).unwrap();

    let best = dir.path().join("tuned/best");
    let result: CalibrationResult =
        serde_json::from_str(&fs::read_to_string(best.join("calibration_result.json")).unwrap())
            .unwrap();
    assert_eq!(result.materials, MaterialCoefficients::new(0.25, 0.1, -10.0));
    assert_abs_diff_eq!(result.penman_monteith.alpha, 0.75, epsilon = 1e-12);
    assert_abs_diff_eq!(result.penman_monteith.beta, 10.0, epsilon = 1e-12);
    assert!(result.error < 1e-12);

    // Starting from alpha = beta = 0 the first round settles on beta = 5, which
    // the second round's materials search moves away from
    assert_eq!(result.errors.len(), 3);
    assert!(result.errors.windows(2).all(|w| w[1] < w[0]));
    assert_abs_diff_eq!(result.errors[0], 0.5612, epsilon = 1e-3);
    let first_round =
        fs::read_to_string(dir.path().join("tuned/0/pm_autotune/final_params.csv")).unwrap();
    assert!(first_round.lines().nth(1).unwrap().starts_with("0.75,5,"));
    assert!(dir.path().join("tuned/2/pm_autotune/errors.csv").exists());

    for file in ["model_output.csv", "description.txt", "final_params.csv"] {
        assert!(best.join(file).exists(), "missing {}", file);
    }
    let materials_errors =
        fs::read_to_string(dir.path().join("tuned/0/materials/errors.csv")).unwrap();
    assert_eq!(materials_errors.lines().next(), Some("a1,a2,a3,error"));
    assert_eq!(materials_errors.lines().count(), 28);

    let observed = observations();
    let sensible = observed.column("sensible_heat").unwrap();
    let modelled = output.column("model_sensible").unwrap();
    for i in 0..output.len() {
        assert_abs_diff_eq!(modelled[i], sensible[i], epsilon = 1e-9);
    }
}

#[test]
fn test_rounds_stop_when_error_stops_improving() {
    let dir = tempdir().unwrap();
    let mut config = ExperimentConfig::from_toml_str(
        &CONFIG.replace("tuning_iterations = 3", "tuning_iterations = 5"),
    )
    .unwrap();
    config.output_dir = dir.path().to_path_buf();

    let model = initial_configuration(&config, &fractions());
    let output = OutputDirectory::new(dir.path());
    let (_, result) = get_best_model_output(&config, model, &observations(), &output).unwrap();

    // Round 3 ties round 2 and is discarded
    assert_eq!(result.errors.len(), 3);
    assert!(dir.path().join("3/materials/errors.csv").exists());
    assert!(!dir.path().join("4").exists());
    assert_eq!(result.materials, MaterialCoefficients::new(0.25, 0.1, -10.0));
}

#[test]
fn test_best_output_takes_last_accepted_round() {
    let dir = tempdir().unwrap();
    let mut config = ExperimentConfig::from_toml_str(
        &CONFIG.replace("tuning_iterations = 3", "tuning_iterations = 2"),
    )
    .unwrap();
    config.output_dir = dir.path().to_path_buf();

    let model = initial_configuration(&config, &fractions());
    assert_eq!(model.penman_monteith, PenmanMonteithParams::new(0.0, 0.0));
    let output = OutputDirectory::new(dir.path());
    let (model_output, result) =
        get_best_model_output(&config, model, &observations(), &output).unwrap();

    // Round 1 is not yet at the truth: a2 lands one grid step off
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors[1] < result.errors[0]);
    assert_eq!(result.materials, MaterialCoefficients::new(0.25, 0.2, -10.0));
    assert_abs_diff_eq!(result.penman_monteith.alpha, 0.75, epsilon = 1e-12);
    assert_abs_diff_eq!(result.penman_monteith.beta, 10.0, epsilon = 1e-12);
    assert_eq!(result.error, result.errors[1]);
    assert!(result.error > 0.0 && result.error < 1e-6);

    let written = fs::read_to_string(dir.path().join("best/final_params.csv")).unwrap();
    assert!(written.lines().nth(1).unwrap().starts_with("0.75,10,0.25,0.2,-10,"));
    assert!(model_output.has_column("model_sensible"));
    assert!(!dir.path().join("2").exists());
}

#[test]
fn test_fixed_experiment_runs_once() {
    let dir = tempdir().unwrap();
    let mut config = ExperimentConfig::from_toml_str(&CONFIG.replace(
        "active_experiment = \"tuned\"",
        "active_experiment = \"fixed\"",
    ))
    .unwrap();
    config.output_dir = dir.path().to_path_buf();

    let observed = observations();
    let output = run_experiment(&config, &fractions(), &observed).unwrap();

    assert!(dir.path().join("model_output.csv").exists());
    assert!(!dir.path().join("best").exists());
    let net = output.column("net_radiation").unwrap();
    let original = observed.column("net_radiation").unwrap();
    assert_abs_diff_eq!(net[0], original[0] - 100.0, epsilon = 1e-12);
    assert!(output.has_column("model_latent"));
}

#[test]
fn test_missing_columns_fail_before_writing() {
    let dir = tempdir().unwrap();
    let mut config = ExperimentConfig::from_toml_str(CONFIG).unwrap();
    config.output_dir = dir.path().join("tuned");

    let t0 = Utc.with_ymd_and_hms(2005, 8, 20, 13, 0, 0).unwrap();
    let observations = EnergyBalanceSeries::new(vec![t0, t0 + Duration::minutes(30)])
        .with_column("net_radiation", vec![100.0, 200.0])
        .unwrap();

    let err = run_experiment(&config, &fractions(), &observations).unwrap_err();
    assert!(matches!(err, Error::Core(LumpsError::MissingColumn(_))));
    assert!(!dir.path().join("tuned").exists());

    // Everything but temperature, which only the Penman-Monteith partition needs
    let mut without_temperature = EnergyBalanceSeries::new(vec![t0, t0 + Duration::minutes(30)]);
    for name in ["net_radiation", "sensible_heat", "latent_heat", "pressure"] {
        without_temperature = without_temperature
            .with_column(name, vec![100.0, 200.0])
            .unwrap();
    }
    let err = run_experiment(&config, &fractions(), &without_temperature).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(LumpsError::MissingColumn(ref name)) if name == "temperature"
    ));
    assert!(!dir.path().join("tuned").exists());
}
