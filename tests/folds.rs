use vsboosts::prelude::*;


/// Tests for `FoldGenerator`.
#[cfg(test)]
pub mod fold_generator {
    use super::*;

    #[test]
    fn alternating_labels_in_two_folds() {
        let labels = [1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let folds = FoldGenerator::new(2)
            .seed(2016)
            .generate(&labels)
            .unwrap();

        assert_eq!(folds.len(), labels.len());
        for fold in 0..2 {
            let members = folds.members(fold);
            let n_positive = members.iter()
                .filter(|&&i| labels[i] == 1.0)
                .count();
            assert_eq!(members.len(), 5);
            assert!(n_positive >= 1);
        }
    }

    #[test]
    fn sizes_differ_by_at_most_one() {
        let labels = (0..103)
            .map(|i| if i % 7 == 0 { 1.0 } else { 0.0 })
            .collect::<Vec<_>>();
        for k in 2..=5 {
            for seed in [0, 1, 2016] {
                let folds = FoldGenerator::new(k).seed(seed).generate(&labels).unwrap();
                assert!(folds.folds().iter().all(|&f| f < k));
                let sizes = (0..k).map(|f| folds.members(f).len()).collect::<Vec<_>>();
                let min = sizes.iter().min().unwrap();
                let max = sizes.iter().max().unwrap();
                assert!(max - min <= 1, "k = {k}, seed = {seed}: {sizes:?}");
                assert_eq!(sizes.iter().sum::<usize>(), labels.len());
            }
        }
    }

    #[test]
    fn same_seed_writes_the_same_file() {
        let labels = (0..40).map(|i| (i % 3 == 0) as u8 as f64).collect::<Vec<_>>();
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        FoldGenerator::new(4).seed(9).generate(&labels).unwrap()
            .write_csv(&a).unwrap();
        FoldGenerator::new(4).seed(9).generate(&labels).unwrap()
            .write_csv(&b).unwrap();
        assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
    }

    #[test]
    fn fold_file_round_trip() {
        let labels = (0..30).map(|i| (i % 2) as f64).collect::<Vec<_>>();
        let folds = FoldGenerator::new(3).seed(5).generate(&labels).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folds.csv");
        folds.write_csv(&path).unwrap();
        let read = FoldAssignment::read_csv(&path, 5).unwrap();
        assert_eq!(read, folds);
    }

    #[test]
    fn minority_class_smaller_than_k() {
        let labels = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let err = FoldGenerator::new(2).generate(&labels).unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidLabel(_)));
    }
}
