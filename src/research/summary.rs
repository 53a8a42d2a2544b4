//! Coloured console tables printed in verbose mode.
use colored::Colorize;

use crate::ensemble::ResultCollector;
use crate::metric::EvalMetric;


const WIDTH: usize = 8;
const PREC_WIDTH: usize = 4;
const FULL_WIDTH: usize = 60;
const STAT_WIDTH: usize = (FULL_WIDTH - 4) / 2;


/// Print the best validation score and round of every fold.
pub fn print_folds(name: &str, scores: &[f64], best_rounds: &[usize]) {
    println!("{}", name.bold().green());
    for (fold, (score, round)) in scores.iter().zip(best_rounds).enumerate() {
        println!(
            "{}    {}    {}",
            format!("  [{: >3}'th fold]", fold + 1).bold().red(),
            format!("[SCORE {:>WIDTH$.PREC_WIDTH$}]", score).bold().yellow(),
            format!("[ROUND {:>WIDTH$}]", round).bold().cyan(),
        );
    }
}


/// Print every record and the selected model.
pub fn print_summary(result: &ResultCollector, metric: EvalMetric) {
    let header = format!(
        "{:=>FULL_WIDTH$}\n{:^FULL_WIDTH$}\n{:->FULL_WIDTH$}",
        "", "RESULTS".bold(), "",
    );
    println!(
        "\n{header}\n\
        + {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}\n\
        + {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}",
        "Selection metric".bold(),
        metric.name().bold().green(),
        "# of folds".bold(),
        result.n_folds().to_string().bold().green(),
    );

    println!(
        "\n      {:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}",
        "CV".bold().red(),
        "CV STD".bold().blue(),
        "TEST".bold().yellow(),
        "WEIGHTED".bold().cyan(),
    );
    for record in result.records() {
        let weighted = record.weighted_score
            .map(|w| format!("{w:>WIDTH$.PREC_WIDTH$}"))
            .unwrap_or_else(|| format!("{:>WIDTH$}", "-"));
        println!("    {}", record.name.bold());
        println!(
            "      {}\t{}\t{}\t{}",
            format!("{:>WIDTH$.PREC_WIDTH$}", record.cv_mean).bold().red(),
            format!("{:>WIDTH$.PREC_WIDTH$}", record.cv_std).bold().blue(),
            format!("{:>WIDTH$.PREC_WIDTH$}", record.test_score).bold().yellow(),
            weighted.bold().cyan(),
        );
    }

    let best = result.best()
        .map(|record| record.name.as_str())
        .unwrap_or("-");
    println!(
        "\n+ {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}\n{:=^FULL_WIDTH$}\n",
        "Best model".bold(),
        best.bold().green(),
        "".bold(),
    );
}
