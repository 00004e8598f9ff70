use crate::error::*;
use crate::sliceop::*;
use std::str::FromStr;

/// Regret-update rule selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    DiscountedCfr,
    CfrPlus,
}

impl FromStr for Algorithm {
    type Err = SolverError;

    fn from_str(s: &str) -> SolverResult<Self> {
        match s {
            "discounted_cfr" => Ok(Self::DiscountedCfr),
            "cfr_plus" => Ok(Self::CfrPlus),
            _ => Err(SolverError::UnknownTrainer(s.to_string())),
        }
    }
}

const ALPHA: f32 = 1.5;
const BETA: f32 = 0.0;
const GAMMA: f32 = 2.0;
const THETA: f32 = 1.0;

/// Per-infoset regret and strategy storage for one `(action node, deal)`
/// slot.
///
/// All buffers are row-major `[num_actions x num_hands]`: the entry for
/// action `a` and hand `h` lives at `a * num_hands + h`.
pub struct Trainable {
    algorithm: Algorithm,
    num_actions: usize,
    num_hands: usize,
    r_plus: Vec<f32>,
    r_plus_sum: Vec<f32>,
    cum_r_plus: Vec<f32>,
    evs: Vec<f32>,
    equities: Vec<f32>,
}

impl Trainable {
    pub fn new(algorithm: Algorithm, num_actions: usize, num_hands: usize) -> Self {
        Self {
            algorithm,
            num_actions,
            num_hands,
            r_plus: vec![0.0; num_actions * num_hands],
            r_plus_sum: vec![0.0; num_hands],
            cum_r_plus: vec![0.0; num_actions * num_hands],
            evs: vec![0.0; num_actions * num_hands],
            equities: vec![0.0; num_actions * num_hands],
        }
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[inline]
    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    #[inline]
    pub fn num_hands(&self) -> usize {
        self.num_hands
    }

    /// The policy played at this iteration: positive regrets normalized per
    /// hand, uniform where no action has positive regret.
    pub fn current_strategy(&self) -> Vec<f32> {
        let mut strategy = vec![0.0; self.num_actions * self.num_hands];
        let default = 1.0 / self.num_actions as f32;
        for action in 0..self.num_actions {
            let row = row_mut(&mut strategy, action, self.num_hands);
            for (hand, prob) in row.iter_mut().enumerate() {
                let index = action * self.num_hands + hand;
                *prob = if self.r_plus_sum[hand] != 0.0 {
                    self.r_plus[index].max(0.0) / self.r_plus_sum[hand]
                } else {
                    default
                };
            }
        }
        strategy
    }

    /// The reported (time-averaged) strategy.
    pub fn average_strategy(&self) -> Vec<f32> {
        // the CFR+ variant reports its current strategy
        if self.algorithm == Algorithm::CfrPlus {
            return self.current_strategy();
        }

        let mut strategy = vec![0.0; self.num_actions * self.num_hands];
        let default = 1.0 / self.num_actions as f32;
        for hand in 0..self.num_hands {
            let mut cum_sum = 0.0;
            for action in 0..self.num_actions {
                cum_sum += self.cum_r_plus[action * self.num_hands + hand];
            }
            for action in 0..self.num_actions {
                let index = action * self.num_hands + hand;
                strategy[index] = if cum_sum > 0.0 {
                    self.cum_r_plus[index] / cum_sum
                } else {
                    default
                };
            }
        }
        strategy
    }

    /// Folds one iteration's action regrets into the cumulative tables.
    ///
    /// `reach_probs` is accepted for interface symmetry with a
    /// reach-weighted averaging rule but is not multiplied into the
    /// cumulative strategy.
    pub fn update_regrets(&mut self, regrets: &[f32], iteration: i32, _reach_probs: &[f32]) {
        assert_eq!(regrets.len(), self.num_actions * self.num_hands);

        match self.algorithm {
            Algorithm::DiscountedCfr => self.update_regrets_discounted(regrets, iteration),
            Algorithm::CfrPlus => self.update_regrets_plus(regrets, iteration),
        }
    }

    fn update_regrets_discounted(&mut self, regrets: &[f32], iteration: i32) {
        let alpha_pow = (iteration as f32).powf(ALPHA);
        let alpha_coef = alpha_pow / (1.0 + alpha_pow);

        self.r_plus_sum.fill(0.0);
        for action in 0..self.num_actions {
            for hand in 0..self.num_hands {
                let index = action * self.num_hands + hand;
                self.r_plus[index] += regrets[index];
                if self.r_plus[index] > 0.0 {
                    self.r_plus[index] *= alpha_coef;
                } else {
                    self.r_plus[index] *= BETA;
                }
                self.r_plus_sum[hand] += self.r_plus[index].max(0.0);
                debug_assert!(!self.r_plus[index].is_nan());
            }
        }

        let current_strategy = self.current_strategy();
        let strategy_coef = (iteration as f32 / (iteration as f32 + 1.0)).powf(GAMMA);
        for (cum, current) in self.cum_r_plus.iter_mut().zip(&current_strategy) {
            *cum = *cum * THETA + *current * strategy_coef;
        }
    }

    fn update_regrets_plus(&mut self, regrets: &[f32], iteration: i32) {
        self.r_plus_sum.fill(0.0);
        for action in 0..self.num_actions {
            for hand in 0..self.num_hands {
                let index = action * self.num_hands + hand;
                self.r_plus[index] = (self.r_plus[index] + regrets[index]).max(0.0);
                self.r_plus_sum[hand] += self.r_plus[index];
                self.cum_r_plus[index] += self.r_plus[index] * iteration as f32;
            }
        }
    }

    /// Stores a normalized EV snapshot, skipping NaN entries.
    pub fn set_evs(&mut self, evs: &[f32]) {
        assert_eq!(evs.len(), self.evs.len());
        for (dst, src) in self.evs.iter_mut().zip(evs) {
            if !src.is_nan() {
                *dst = *src;
            }
        }
    }

    /// Stores a normalized equity snapshot, skipping NaN entries.
    pub fn set_equities(&mut self, equities: &[f32]) {
        assert_eq!(equities.len(), self.equities.len());
        for (dst, src) in self.equities.iter_mut().zip(equities) {
            if !src.is_nan() {
                *dst = *src;
            }
        }
    }

    #[inline]
    pub fn evs(&self) -> &[f32] {
        &self.evs
    }

    #[inline]
    pub fn equities(&self) -> &[f32] {
        &self.equities
    }

    /// Deep-copies the regret state of `other`, so isomorphic deals start
    /// from identical tables after the warm-up phase.
    pub fn copy_strategy_from(&mut self, other: &Trainable) {
        debug_assert_eq!(self.algorithm, other.algorithm);
        debug_assert_eq!(self.r_plus.len(), other.r_plus.len());
        self.r_plus.copy_from_slice(&other.r_plus);
        self.cum_r_plus.copy_from_slice(&other.cum_r_plus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy_sums_to_one(strategy: &[f32], num_actions: usize, num_hands: usize) {
        for hand in 0..num_hands {
            let sum: f32 = (0..num_actions)
                .map(|a| strategy[a * num_hands + hand])
                .sum();
            assert!((sum - 1.0).abs() < 1e-5, "sum = {sum}");
        }
    }

    #[test]
    fn test_initial_strategy_is_uniform() {
        let trainable = Trainable::new(Algorithm::DiscountedCfr, 3, 4);
        let strategy = trainable.current_strategy();
        assert!(strategy.iter().all(|&p| (p - 1.0 / 3.0).abs() < 1e-6));
        strategy_sums_to_one(&trainable.average_strategy(), 3, 4);
    }

    #[test]
    fn test_r_plus_sum_invariant() {
        let mut trainable = Trainable::new(Algorithm::DiscountedCfr, 2, 3);
        let regrets = [1.0, -2.0, 3.0, -1.0, 4.0, 0.5];
        trainable.update_regrets(&regrets, 1, &[1.0; 3]);
        trainable.update_regrets(&[0.5, 0.5, -4.0, 1.0, 1.0, 1.0], 2, &[1.0; 3]);

        for hand in 0..3 {
            let expected: f32 = (0..2)
                .map(|a| trainable.r_plus[a * 3 + hand].max(0.0))
                .sum();
            assert_eq!(trainable.r_plus_sum[hand], expected);
        }
        // beta = 0 discards negative regrets entirely
        assert!(trainable.r_plus.iter().all(|&r| r >= 0.0));
    }

    #[test]
    fn test_strategies_sum_to_one_after_updates() {
        for algorithm in [Algorithm::DiscountedCfr, Algorithm::CfrPlus] {
            let mut trainable = Trainable::new(algorithm, 3, 2);
            trainable.update_regrets(&[1.0, 2.0, -1.0, 0.0, 3.0, 1.0], 1, &[1.0; 2]);
            trainable.update_regrets(&[-1.0, 1.0, 2.0, 2.0, -3.0, 0.0], 2, &[1.0; 2]);
            strategy_sums_to_one(&trainable.current_strategy(), 3, 2);
            strategy_sums_to_one(&trainable.average_strategy(), 3, 2);
        }
    }

    #[test]
    fn test_current_strategy_matches_positive_regrets() {
        let mut trainable = Trainable::new(Algorithm::DiscountedCfr, 2, 1);
        trainable.update_regrets(&[3.0, 1.0], 1, &[1.0]);
        let strategy = trainable.current_strategy();
        assert!((strategy[0] - 0.75).abs() < 1e-6);
        assert!((strategy[1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_set_evs_skips_nan() {
        let mut trainable = Trainable::new(Algorithm::DiscountedCfr, 1, 2);
        trainable.set_evs(&[1.5, 2.5]);
        trainable.set_evs(&[f32::NAN, 3.5]);
        assert_eq!(trainable.evs(), &[1.5, 3.5]);
    }

    #[test]
    fn test_copy_strategy() {
        let mut a = Trainable::new(Algorithm::DiscountedCfr, 2, 2);
        let mut b = Trainable::new(Algorithm::DiscountedCfr, 2, 2);
        a.update_regrets(&[1.0, -1.0, 2.0, 0.5], 1, &[1.0; 2]);
        a.set_evs(&[9.0; 4]);
        b.copy_strategy_from(&a);
        assert_eq!(b.r_plus, a.r_plus);
        assert_eq!(b.cum_r_plus, a.cum_r_plus);
        // EV snapshots are intentionally not copied
        assert_eq!(b.evs(), &[0.0; 4]);
    }
}
