use std::sync::Arc;
use vsboosts::prelude::*;


fn bundle(n: usize, held_out: usize) -> Arc<DataBundle> {
    let y = (0..n).map(|i| ((i * 7) % 3 == 0) as u8 as f64).collect::<Vec<_>>();
    let signal = y.iter()
        .enumerate()
        .map(|(i, &y)| y * 2.0 + (i % 5) as f64 * 0.1)
        .collect::<Vec<_>>();
    let noise = (0..n).map(|i| ((i * 13) % 11) as f64).collect::<Vec<_>>();
    let sample = Sample::from_columns(
        vec![
            Feature::from_values("signal", signal),
            Feature::from_values("noise", noise),
        ],
        y.clone(),
    ).unwrap();
    let folds = FoldGenerator::new(5).seed(3).generate(&y).unwrap();
    Arc::new(DataBundle::build(&folds, sample, OuterSplit::HeldOutFolds(held_out)).unwrap())
}


/// Tests for `FirstLayerModel` and `SecondLayerModel`.
#[cfg(test)]
pub mod stacked_models {
    use super::*;

    #[test]
    fn holdout_is_aligned_and_complete() {
        let bundle = bundle(60, 1);
        let mut model = FirstLayerModel::new(
            "tree", bundle.clone(), ModelKind::GBTREE_LOGISTIC, EvalMetric::RocAuc,
        );
        assert_eq!(model.state(), ModelState::Unconfigured);
        model.cross_validate().unwrap();
        assert_eq!(model.fold_scores().len(), bundle.n_folds());
        assert_eq!(model.best_rounds().len(), bundle.n_folds());

        let holdout = model.generate_holdout_pred().unwrap().to_vec();
        let n_train = bundle.training().shape().0;
        assert_eq!(holdout.len(), n_train);
        assert!(holdout.iter().all(|p| (0.0..=1.0).contains(p)));

        // Each validation example gets the prediction of its own fold model.
        for fold in 0..bundle.n_folds() {
            let expected = model.boosters()[fold].predict_all(bundle.validation_fold(fold));
            for (&p, y) in bundle.validation_positions(fold).iter().zip(expected) {
                assert_eq!(holdout[p], y);
            }
        }
    }

    #[test]
    fn holdout_before_cross_validation_is_a_state_error() {
        let mut model = FirstLayerModel::new(
            "linear", bundle(60, 1), ModelKind::GBLINEAR_LOGISTIC, EvalMetric::PrAuc,
        );
        let err = model.generate_holdout_pred().unwrap_err();
        assert!(matches!(err, ScreeningError::State(_)));
    }

    #[test]
    fn test_predictions_average_the_folds() {
        let bundle = bundle(60, 1);
        let mut model = FirstLayerModel::new(
            "tree", bundle.clone(), ModelKind::GBTREE_LOGISTIC, EvalMetric::RocAuc,
        );
        model.cross_validate().unwrap();
        let test = model.predict_test().unwrap();

        let n_folds = model.boosters().len() as f64;
        let per_fold = model.boosters().iter()
            .map(|b| b.predict_all(bundle.test()))
            .collect::<Vec<_>>();
        for (i, p) in test.iter().enumerate() {
            let mean = per_fold.iter().map(|f| f[i]).sum::<f64>() / n_folds;
            assert!((p - mean).abs() < 1e-12);
        }
    }

    #[test]
    fn second_layer_reuses_the_folds() {
        let bundle = bundle(60, 1);
        let first = [ModelKind::GBTREE_LOGISTIC, ModelKind::GBLINEAR_LOGISTIC]
            .into_iter()
            .map(|kind| {
                let mut model = FirstLayerModel::new(
                    format!("layer1_{kind}"), bundle.clone(), kind, EvalMetric::RocAuc,
                );
                model.cross_validate().unwrap();
                model.generate_holdout_pred().unwrap();
                model
            })
            .collect::<Vec<_>>();

        let mut meta = SecondLayerModel::new(
            "layer2", bundle.clone(), &first,
            ModelKind::GBTREE_LOGISTIC, EvalMetric::RocAuc,
        ).unwrap();
        let meta_bundle = meta.assemble_training_data().unwrap();
        assert_eq!(meta_bundle.layout(), bundle.layout());
        assert_eq!(meta_bundle.training().shape(), (bundle.training().shape().0, 2));
        assert_eq!(meta_bundle.test_labels(), bundle.test_labels());
        for fold in 0..bundle.n_folds() {
            assert_eq!(
                meta_bundle.validation_positions(fold),
                bundle.validation_positions(fold),
            );
        }

        let (mean, _) = meta.cross_validate().unwrap();
        assert!((0.0..=1.0).contains(&mean));
        assert_eq!(meta.input_names(), vec!["layer1_GbtreeLogistic", "layer1_GblinearLogistic"]);
    }
}
