//! Scoring module - chain rewards and the solver's objective
//!
//! Scoring rules:
//! - Each clear step awards `clear_points` per cell in every matched group; a
//!   cell in a crossing pair of runs counts once per group.
//! - Step `n` of a cascade is multiplied by `chain_multipliers[n - 1]`; the
//!   last tier repeats for deeper chains. Tiers never decrease.
//! - The objective subtracts `height_penalty` per row of the tallest column
//!   left behind, so low boards are preferred.

use thiserror::Error;

use crate::board::Board;

/// Number of distinct multiplier tiers a policy can hold
pub const CHAIN_TIERS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("chain multipliers must not be empty")]
    NoMultipliers,
    #[error("at most 8 chain multipliers are supported, got {0}")]
    TooManyTiers(usize),
    #[error("chain multipliers must be positive and non-decreasing: {0:?}")]
    NotMonotonic(Vec<i64>),
    #[error("clear points must be positive, got {0}")]
    NonPositiveClearPoints(i64),
    #[error("height penalty must not be negative, got {0}")]
    NegativeHeightPenalty(i64),
}

/// Tunable scoring constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScorePolicy {
    pub clear_points: i64,
    chain_multipliers: [i64; CHAIN_TIERS],
    pub height_penalty: i64,
}

impl ScorePolicy {
    pub const DEFAULT: ScorePolicy = ScorePolicy {
        clear_points: 10,
        chain_multipliers: [1, 2, 4, 8, 8, 8, 8, 8],
        height_penalty: 1,
    };

    /// Build a policy, validating the multiplier curve
    ///
    /// Fewer than [`CHAIN_TIERS`] multipliers are padded with the last one.
    pub fn new(
        clear_points: i64,
        chain_multipliers: &[i64],
        height_penalty: i64,
    ) -> Result<Self, PolicyError> {
        if clear_points <= 0 {
            return Err(PolicyError::NonPositiveClearPoints(clear_points));
        }
        if height_penalty < 0 {
            return Err(PolicyError::NegativeHeightPenalty(height_penalty));
        }
        let Some(&last) = chain_multipliers.last() else {
            return Err(PolicyError::NoMultipliers);
        };
        if chain_multipliers.len() > CHAIN_TIERS {
            return Err(PolicyError::TooManyTiers(chain_multipliers.len()));
        }
        let monotonic = chain_multipliers[0] > 0
            && chain_multipliers.windows(2).all(|w| w[0] <= w[1]);
        if !monotonic {
            return Err(PolicyError::NotMonotonic(chain_multipliers.to_vec()));
        }

        let mut tiers = [last; CHAIN_TIERS];
        tiers[..chain_multipliers.len()].copy_from_slice(chain_multipliers);
        Ok(Self {
            clear_points,
            chain_multipliers: tiers,
            height_penalty,
        })
    }

    /// Multiplier for cascade step `depth` (1-based); 0 for depth 0
    pub fn multiplier(&self, depth: usize) -> i64 {
        if depth == 0 {
            return 0;
        }
        self.chain_multipliers[(depth - 1).min(CHAIN_TIERS - 1)]
    }

    pub fn multipliers(&self) -> &[i64] {
        &self.chain_multipliers
    }

    /// Points for clearing `group_cells` (summed over groups) at step `depth`
    pub fn chain_points(&self, depth: usize, group_cells: usize) -> i64 {
        self.clear_points
            .saturating_mul(group_cells as i64)
            .saturating_mul(self.multiplier(depth))
    }

    /// Objective value of reaching `after` from `before`
    ///
    /// Chain points gained, minus the height penalty on the resulting stack.
    pub fn score_delta(&self, before: &Board, after: &Board) -> i64 {
        let gained = after.points().saturating_sub(before.points());
        gained - self.height_penalty.saturating_mul(after.stack_height() as i64)
    }
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// [`ScorePolicy::score_delta`] with the default policy
pub fn score_delta(before: &Board, after: &Board) -> i64 {
    ScorePolicy::DEFAULT.score_delta(before, after)
}
