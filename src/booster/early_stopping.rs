//! Stops boosting when a validation metric no longer improves.


/// Early stopping state.
///
/// A round improves only if its value is strictly better than the best one,
/// so among equal values the earliest round is kept.
///
/// # Example
/// ```
/// use vsboosts::prelude::*;
/// // Higher is better (e.g. ROC-AUC), stop after 2 rounds without improvement.
/// let mut early_stop = EarlyStopping::new(2, true);
/// assert!(!early_stop.should_stop(0.8));
/// assert!(!early_stop.should_stop(0.8));
/// assert!(early_stop.should_stop(0.7));
/// assert_eq!(early_stop.best_round(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best_value: Option<f64>,
    best_round: usize,
    current_round: usize,
    higher_is_better: bool,
}


impl EarlyStopping {
    /// Create a new early stopping state that tolerates
    /// `patience` rounds without improvement.
    pub fn new(patience: usize, higher_is_better: bool) -> Self {
        Self {
            patience,
            best_value: None,
            best_round: 0,
            current_round: 0,
            higher_is_better,
        }
    }


    /// Record the metric value of the current round.
    /// Returns `true` if no improvement was seen for `patience` rounds.
    pub fn should_stop(&mut self, value: f64) -> bool {
        let is_improvement = match self.best_value {
            None => true,
            Some(best) if self.higher_is_better => value > best,
            Some(best) => value < best,
        };

        if is_improvement {
            self.best_value = Some(value);
            self.best_round = self.current_round;
        }

        self.current_round += 1;

        self.current_round - self.best_round > self.patience
    }


    /// Returns the best metric value observed.
    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }


    /// Returns the 0-based round at which the best value was observed.
    pub fn best_round(&self) -> usize {
        self.best_round
    }


    /// Returns the number of recorded rounds.
    pub fn current_round(&self) -> usize {
        self.current_round
    }


    /// Returns the patience.
    pub fn patience(&self) -> usize {
        self.patience
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_going_while_improving() {
        let mut early_stop = EarlyStopping::new(3, false);
        for value in [1.0, 0.9, 0.8, 0.7, 0.6] {
            assert!(!early_stop.should_stop(value));
        }
        assert_eq!(early_stop.best_round(), 4);
        assert_eq!(early_stop.best_value(), Some(0.6));
    }

    #[test]
    fn stops_after_patience() {
        let mut early_stop = EarlyStopping::new(3, false);
        assert!(!early_stop.should_stop(0.5));
        assert!(!early_stop.should_stop(0.6));
        assert!(!early_stop.should_stop(0.7));
        assert!(early_stop.should_stop(0.8));
        assert_eq!(early_stop.best_round(), 0);
    }

    #[test]
    fn ties_keep_the_earliest_round() {
        let mut early_stop = EarlyStopping::new(5, true);
        for value in [0.7, 0.9, 0.9, 0.9] {
            early_stop.should_stop(value);
        }
        assert_eq!(early_stop.best_round(), 1);
        assert_eq!(early_stop.current_round(), 4);
    }

    #[test]
    fn unit_patience_stops_on_the_first_miss() {
        let mut early_stop = EarlyStopping::new(1, true);
        assert!(!early_stop.should_stop(0.5));
        assert!(early_stop.should_stop(0.5));
    }
}
