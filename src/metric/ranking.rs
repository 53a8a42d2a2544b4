//! Rank-based metrics for binary labels.
use std::cmp::Ordering;


/// Default early-recognition parameter of BEDROC.
pub const DEFAULT_BEDROC_ALPHA: f64 = 20.0;


/// Indices of `y_score` sorted by score descending.
/// Ties keep the original order and `NaN` scores are ranked last.
pub(crate) fn descending_order(y_score: &[f64]) -> Vec<usize> {
    let mut order = (0..y_score.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        let (sa, sb) = (y_score[a], y_score[b]);
        let by_score = match (sa.is_nan(), sb.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            // `-0.0` and `0.0` are the same score.
            (false, false) => (sb + 0.0).total_cmp(&(sa + 0.0)),
        };
        by_score.then(a.cmp(&b))
    });
    order
}


fn count_positives(y_true: &[f64]) -> usize {
    y_true.iter().filter(|&&y| y > 0.5).count()
}


/// Area under the ROC curve.
///
/// Computed as the Mann-Whitney statistic.
/// Tied scores share their average rank,
/// so the value only depends on the ordering of `y_score`.
/// Returns `0.5` when one of the classes is absent.
pub fn roc_auc(y_true: &[f64], y_score: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_score.len());
    let n = y_true.len();
    let n_pos = count_positives(y_true);
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let order = descending_order(y_score);

    // Descending ranks: the highest score gets rank 1.
    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && y_score[order[j]] == y_score[order[i]] {
            j += 1;
        }
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let n_pos_in_group = order[i..j].iter()
            .filter(|&&k| y_true[k] > 0.5)
            .count();
        rank_sum_pos += avg_rank * n_pos_in_group as f64;
        i = j;
    }

    let n_pos_f = n_pos as f64;
    let n_neg_f = n_neg as f64;
    // Convert descending ranks of the positives into
    // the number of (positive, negative) pairs ranked correctly.
    let u = n_pos_f * (n as f64 + 1.0) - rank_sum_pos - n_pos_f * (n_pos_f + 1.0) / 2.0;
    u / (n_pos_f * n_neg_f)
}


/// Area under the precision-recall curve, as average precision.
///
/// Examples with the same score form one threshold.
/// Returns `0` when there is no positive example.
pub fn pr_auc(y_true: &[f64], y_score: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_score.len());
    let n = y_true.len();
    let n_pos = count_positives(y_true);
    if n_pos == 0 {
        return 0.0;
    }

    let order = descending_order(y_score);

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut prev_recall = 0.0;
    let mut area = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && y_score[order[j]] == y_score[order[i]] {
            if y_true[order[j]] > 0.5 { tp += 1; } else { fp += 1; }
            j += 1;
        }
        let recall = tp as f64 / n_pos as f64;
        let precision = tp as f64 / (tp + fp) as f64;
        area += (recall - prev_recall) * precision;
        prev_recall = recall;
        i = j;
    }
    area
}


/// Boltzmann-enhanced discrimination of ROC
/// (Truchon & Bayly, 2007).
///
/// Actives ranked early are weighted by `exp(-alpha * rank / n)`.
/// Tied scores are ranked by original index.
/// Returns `0` without actives and `1` when every example is active.
pub fn bedroc(y_true: &[f64], y_score: &[f64], alpha: f64) -> f64 {
    debug_assert_eq!(y_true.len(), y_score.len());
    let n = y_true.len();
    let n_actives = count_positives(y_true);
    if n_actives == 0 {
        return 0.0;
    }
    if n_actives == n {
        return 1.0;
    }

    let n_f = n as f64;
    let sum_exp = descending_order(y_score).into_iter()
        .enumerate()
        .filter(|&(_, i)| y_true[i] > 0.5)
        .map(|(rank, _)| (-alpha * (rank + 1) as f64 / n_f).exp())
        .sum::<f64>();

    let ratio = n_actives as f64 / n_f;
    let random_sum = ratio * (1.0 - (-alpha).exp()) / ((alpha / n_f).exp() - 1.0);
    let rie = sum_exp / random_sum;

    let half = alpha / 2.0;
    let factor = ratio * half.sinh() / (half.cosh() - (half - alpha * ratio).cosh());
    let offset = 1.0 / (1.0 - (alpha * (1.0 - ratio)).exp());

    rie * factor + offset
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_and_reversed_rankings() {
        let y = [1.0, 1.0, 0.0, 0.0];
        assert_eq!(roc_auc(&y, &[0.9, 0.8, 0.2, 0.1]), 1.0);
        assert_eq!(roc_auc(&y, &[0.1, 0.2, 0.8, 0.9]), 0.0);
        assert_eq!(pr_auc(&y, &[0.9, 0.8, 0.2, 0.1]), 1.0);
    }

    #[test]
    fn nan_scores_are_ranked_last() {
        let s = [0.2, f64::NAN, 0.9, f64::NAN, -0.0, 0.0];
        assert_eq!(descending_order(&s), vec![2, 0, 4, 5, 1, 3]);

        // The positive with a NaN score sits below every negative.
        let y = [0.0, 1.0, 0.0];
        assert_eq!(roc_auc(&y, &[0.3, f64::NAN, 0.1]), 0.0);
    }

    #[test]
    fn ties_count_half() {
        let y = [1.0, 0.0];
        assert_eq!(roc_auc(&y, &[0.5, 0.5]), 0.5);
    }

    #[test]
    fn single_class_is_uninformative() {
        assert_eq!(roc_auc(&[1.0, 1.0], &[0.1, 0.2]), 0.5);
        assert_eq!(pr_auc(&[0.0, 0.0], &[0.1, 0.2]), 0.0);
    }

    #[test]
    fn auc_of_a_mixed_ranking() {
        // Pairs (pos, neg): (0.8 > 0.6), (0.8 > 0.2), (0.4 < 0.6), (0.4 > 0.2)
        let y = [1.0, 0.0, 1.0, 0.0];
        let s = [0.8, 0.6, 0.4, 0.2];
        assert!((roc_auc(&y, &s) - 0.75).abs() < 1e-12);
        // Precision 1 at recall 0.5, precision 2/3 at recall 1.
        assert!((pr_auc(&y, &s) - (0.5 + 0.5 * 2.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn bedroc_rewards_early_actives() {
        let y = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let early = [0.9, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1];
        let late  = [0.0, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1];
        let hi = bedroc(&y, &early, DEFAULT_BEDROC_ALPHA);
        let lo = bedroc(&y, &late, DEFAULT_BEDROC_ALPHA);
        assert!(hi > lo);
        assert!(hi > 0.9);
        assert!(lo < 0.5);
    }
}
