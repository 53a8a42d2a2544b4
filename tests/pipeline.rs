use std::fs;
use std::path::Path;
use std::process::Command;

use vsboosts::prelude::*;
use vsboosts::config::PipelineConfig;
use vsboosts::pipeline::Pipeline;


fn bits(row: usize, active: bool, width: usize) -> String {
    (0..width)
        .map(|j| {
            let on = if j == 0 { active } else { (row + j) % 3 == 0 };
            if on { '1' } else { '0' }
        })
        .collect()
}


fn write_table(path: &Path, n: usize, with_labels: bool) {
    let mut text = String::from(if with_labels {
        "id,fp_morgan,fp_maccs,active\n"
    } else {
        "id,fp_morgan,fp_maccs\n"
    });
    for i in 0..n {
        let active = i % 2 == 1;
        text.push_str(&format!("m{i},{},{}", bits(i, active, 8), bits(i + 1, active, 5)));
        if with_labels {
            text.push_str(&format!(",{}", active as u8));
        }
        text.push('\n');
    }
    if with_labels {
        // Unlabeled molecules are dropped.
        text.push_str(&format!("unlabeled,{},{},\n", bits(0, true, 8), bits(0, true, 5)));
    }
    fs::write(path, text).unwrap();
}


fn config_json(dir: &Path) -> String {
    format!(
        r#"{{
            "target_name": "toy",
            "training_data_path": "{train}",
            "prediction_data_path": "{predict}",
            "label_columns": ["active"],
            "evaluation_metric": "ROCAUC",
            "output_dir": "{out}",
            "fingerprint_columns": {{"morgan": "fp_morgan", "maccs": "fp_maccs"}},
            "fold_file": "{folds}",
            "seed": 11
        }}"#,
        train = dir.join("train.csv").display(),
        predict = dir.join("predict.csv").display(),
        out = dir.join("out").display(),
        folds = dir.join("folds.csv").display(),
    )
}


fn write_fingerprint_table(path: &Path, n: usize) {
    let mut text = String::from("smiles,fp_morgan,fp_maccs,active\n");
    for i in 0..n {
        let active = i % 2 == 1;
        text.push_str(&format!(
            "CCO,{},{},{}\n", bits(i, active, 8), bits(i + 1, active, 167), active as u8,
        ));
    }
    fs::write(path, text).unwrap();
}


fn smiles_config_json(dir: &Path, morgan_bits: usize) -> String {
    format!(
        r#"{{
            "target_name": "toy",
            "training_data_path": "{train}",
            "prediction_data_path": "{predict}",
            "label_columns": ["active"],
            "evaluation_metric": "ROCAUC",
            "output_dir": "{out}",
            "smiles_column": "smiles",
            "fingerprint_columns": {{"morgan": "fp_morgan", "maccs": "fp_maccs"}},
            "morgan_bits": {morgan_bits}
        }}"#,
        train = dir.join("train.csv").display(),
        predict = dir.join("predict.csv").display(),
        out = dir.join("out").display(),
    )
}


/// Tests for the configuration-driven run and the command line.
#[cfg(test)]
pub mod screening_run {
    use super::*;

    #[test]
    fn a_full_run_writes_every_output() {
        let dir = tempfile::tempdir().unwrap();
        write_table(&dir.path().join("train.csv"), 40, true);
        write_table(&dir.path().join("predict.csv"), 6, false);

        let config = PipelineConfig::from_json_str(&config_json(dir.path())).unwrap();
        let pipeline = Pipeline::new(config);

        let inputs = pipeline.load_inputs().unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(inputs.iter().all(|input| input.n_rows() == 40));

        let output = pipeline.run().unwrap();
        // 2 models per input, 2 meta models.
        assert_eq!(output.result.len(), 6);
        assert!(output.reports.result.is_file());
        assert!(output.reports.all_models.is_file());
        assert!(dir.path().join("folds.csv").is_file());

        let prediction = output.prediction.unwrap();
        let text = fs::read_to_string(prediction).unwrap();
        assert_eq!(text.lines().count(), 7);

        // A second run reuses the fold file.
        let before = FoldAssignment::read_csv(dir.path().join("folds.csv"), 11).unwrap();
        pipeline.run().unwrap();
        let after = FoldAssignment::read_csv(dir.path().join("folds.csv"), 11).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn missing_keys_are_config_errors() {
        let err = PipelineConfig::from_json_str(r#"{
            "target_name": "toy",
            "label_columns": ["active"],
            "evaluation_metric": "ROCAUC"
        }"#).unwrap_err();
        let ScreeningError::Config(message) = err else { panic!("{err:?}") };
        assert!(message.contains("training_data_path"));
        assert!(message.contains("output_dir"));
    }

    #[test]
    fn unknown_metric_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let json = config_json(dir.path()).replace("\"ROCAUC\"", "\"F1\"");
        let err = PipelineConfig::from_json_str(&json).unwrap_err();
        assert!(matches!(err, ScreeningError::Config(_)));
    }

    #[test]
    fn prediction_fingerprints_fall_back_to_smiles() {
        let dir = tempfile::tempdir().unwrap();
        write_fingerprint_table(&dir.path().join("train.csv"), 40);
        fs::write(
            dir.path().join("predict.csv"),
            "smiles\nCCO\nc1ccccc1O\nCC(=O)N\n",
        ).unwrap();

        let json = smiles_config_json(dir.path(), 8);
        let pipeline = Pipeline::new(PipelineConfig::from_json_str(&json).unwrap());
        let output = pipeline.run().unwrap();

        let text = fs::read_to_string(output.prediction.unwrap()).unwrap();
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn prediction_fingerprints_must_match_the_training_width() {
        let dir = tempfile::tempdir().unwrap();
        write_fingerprint_table(&dir.path().join("train.csv"), 40);
        fs::write(dir.path().join("predict.csv"), "smiles\nCCO\n").unwrap();

        // The training column has 8 bits, the computed one would have 16.
        let json = smiles_config_json(dir.path(), 16);
        let pipeline = Pipeline::new(PipelineConfig::from_json_str(&json).unwrap());
        let err = pipeline.run().unwrap_err();
        assert!(matches!(err, ScreeningError::DataShape(_)));
        assert!(!dir.path().join("out").join("toy_result.csv").exists());
    }

    #[test]
    fn the_cli_fails_without_a_config() {
        let dir = tempfile::tempdir().unwrap();
        let status = Command::new(env!("CARGO_BIN_EXE_vsboosts"))
            .arg(dir.path().join("missing.json"))
            .status()
            .unwrap();
        assert!(!status.success());
    }
}
