use vsboosts::prelude::*;
use vsboosts::research::write_reports;


const N: usize = 48;


fn features(n: usize) -> Sample {
    let signal = (0..n)
        .map(|i| (i % 2) as f64 + (i % 7) as f64 * 0.05)
        .collect::<Vec<_>>();
    let noise = (0..n).map(|i| ((i * 17) % 13) as f64).collect::<Vec<_>>();
    Sample::from_columns(
        vec![
            Feature::from_values("signal", signal),
            Feature::from_values("noise", noise),
        ],
        Vec::new(),
    ).unwrap()
}


fn input() -> LabeledFeatures {
    let active = (0..N).map(|i| (i % 2) as f64).collect::<Vec<_>>();
    let potency = (0..N)
        .map(|i| 5.0 + 2.0 * (i % 2) as f64 + (i % 5) as f64 * 0.3)
        .collect::<Vec<_>>();
    LabeledFeatures::new("fp", features(N))
        .label("active", active)
        .label("potency", potency)
}


fn trained() -> VsEnsemble {
    let config = EnsembleConfig::new(EvalMetric::RocAuc).seed(7);
    let mut ensemble = VsEnsemble::new(vec![input()], config).unwrap();
    ensemble.train().unwrap();
    ensemble
}


/// End-to-end tests of `VsEnsemble`.
#[cfg(test)]
pub mod stacked_ensemble {
    use super::*;

    #[test]
    fn results_require_training() {
        let config = EnsembleConfig::new(EvalMetric::RocAuc);
        let ensemble = VsEnsemble::new(vec![input()], config).unwrap();
        let err = ensemble.training_result().unwrap_err();
        assert!(matches!(err, ScreeningError::State(_)));
        assert!(ensemble.predict(&[features(4)]).is_err());
    }

    #[test]
    fn every_model_is_recorded() {
        let ensemble = trained();
        let names = ensemble.detail_result().unwrap()
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![
            "layer1_data1_binary_GbtreeLogistic_ROCAUC",
            "layer1_data1_binary_GblinearLogistic_ROCAUC",
            "layer1_data2_continuous_GbtreeRegression_RMSE",
            "layer1_data2_continuous_GblinearRegression_RMSE",
            "layer2_GbtreeLogistic_ROCAUC",
            "layer2_GblinearLogistic_ROCAUC",
        ]);

        for record in ensemble.detail_result().unwrap() {
            let regression = !record.kind.is_classifier();
            assert_eq!(record.selectable, !regression);
            assert_eq!(record.weighted_score.is_none(), regression);
        }
    }

    #[test]
    fn the_best_model_has_the_highest_weighted_score() {
        let ensemble = trained();
        let best = ensemble.training_result().unwrap();
        assert!(best.selectable);
        assert_eq!(best.metric, EvalMetric::RocAuc);
        let top = ensemble.detail_result().unwrap()
            .iter()
            .filter_map(|r| r.weighted_score)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(best.weighted_score, Some(top));
        assert_eq!(ensemble.best_model_name().unwrap(), best.name);
    }

    #[test]
    fn predictions_have_one_value_per_row() {
        let ensemble = trained();
        let test = ensemble.best_test_predictions().unwrap();
        assert_eq!(test.len(), ensemble.test_labels().len());

        let predictions = ensemble.predict(&[features(10)]).unwrap();
        assert_eq!(predictions.len(), 10);
        assert!(predictions.iter().all(|p| (0.0..=1.0).contains(p)));

        let err = ensemble.predict(&[features(10), features(10)]).unwrap_err();
        assert!(matches!(err, ScreeningError::DataShape(_)));
    }

    #[test]
    fn secondary_labels_must_match_the_rows() {
        let input = LabeledFeatures::new("fp", features(N))
            .label("active", (0..N).map(|i| (i % 2) as f64).collect())
            .label("potency", vec![1.0; N - 1]);
        let err = VsEnsemble::new(vec![input], EnsembleConfig::new(EvalMetric::RocAuc))
            .unwrap_err();
        assert!(matches!(err, ScreeningError::DataShape(_)));
    }

    #[test]
    fn the_primary_label_must_be_binary() {
        let input = LabeledFeatures::new("fp", features(N))
            .label("potency", (0..N).map(|i| i as f64).collect());
        let err = VsEnsemble::new(vec![input], EnsembleConfig::new(EvalMetric::RocAuc))
            .unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidLabel(_)));
    }

    #[test]
    fn an_external_test_split_uses_every_fold_for_training() {
        let n_test = 20;
        let test_labels = (0..n_test).map(|i| ((i + 1) % 2) as f64).collect::<Vec<_>>();
        let test = features(n_test).with_target(test_labels.clone()).unwrap();
        let config = EnsembleConfig::new(EvalMetric::RocAuc)
            .seed(7)
            .external_test(vec![test]);
        let mut ensemble = VsEnsemble::new(vec![input()], config).unwrap();

        let bundle = ensemble.primary_bundle();
        assert_eq!(bundle.n_folds(), ensemble.fold_assignment().n_folds());
        assert_eq!(bundle.training().shape().0, N);
        assert_eq!(bundle.test_rows(), None);

        let result = ensemble.train().unwrap();
        assert_eq!(result.len(), 6);
        assert_eq!(ensemble.test_labels(), &test_labels[..]);
        assert_eq!(ensemble.best_test_predictions().unwrap().len(), n_test);
    }

    #[test]
    fn one_external_test_set_per_input() {
        let config = EnsembleConfig::new(EvalMetric::RocAuc)
            .external_test(Vec::new());
        let err = VsEnsemble::new(vec![input()], config).unwrap_err();
        assert!(matches!(err, ScreeningError::DataShape(_)));
    }

    #[test]
    fn models_that_fail_to_train_are_left_out() {
        // The squared error of these labels overflows in the first round.
        let diverging = (0..N)
            .map(|i| if i % 2 == 0 { 1e200 } else { -1e200 })
            .collect::<Vec<_>>();
        let input = LabeledFeatures::new("fp", features(N))
            .label("active", (0..N).map(|i| (i % 2) as f64).collect())
            .label("diverging", diverging);
        let config = EnsembleConfig::new(EvalMetric::RocAuc).seed(7);
        let mut ensemble = VsEnsemble::new(vec![input], config).unwrap();
        let result = ensemble.train().unwrap();

        let names = result.records()
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![
            "layer1_data1_binary_GbtreeLogistic_ROCAUC",
            "layer1_data1_binary_GblinearLogistic_ROCAUC",
            "layer2_GbtreeLogistic_ROCAUC",
            "layer2_GblinearLogistic_ROCAUC",
        ]);
        assert_eq!(ensemble.layer1_models().len(), 2);
        for model in ensemble.layer2_models() {
            assert_eq!(model.input_names().len(), 2);
        }
        assert_eq!(ensemble.predict(&[features(5)]).unwrap().len(), 5);
    }

    #[test]
    fn reports_are_written() {
        let ensemble = trained();
        let dir = tempfile::tempdir().unwrap();
        let paths = write_reports(&ensemble, dir.path(), "toy").unwrap();
        for path in [
            &paths.result,
            &paths.all_models,
            &paths.cv_folds,
            &paths.enrichment,
            &paths.folds,
        ] {
            assert!(path.is_file(), "{} is missing", path.display());
        }
        let all = std::fs::read_to_string(&paths.all_models).unwrap();
        assert_eq!(all.lines().count(), 7);

        let folds = FoldAssignment::read_csv(&paths.folds, 7).unwrap();
        assert_eq!(&folds, ensemble.fold_assignment());
    }
}
