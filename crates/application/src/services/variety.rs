//! Weighted tie-breaking between near-equal expression candidates
//!
//! When the top candidate's score is decisive the ranking wins outright.
//! When it is weak, a weighted random pick over the top few candidates keeps
//! the mascot from always landing on the same face for ambiguous text. The
//! random source is injected so callers (and tests) control determinism.

use domain::Expression;
use rand::Rng;

use crate::services::expression_scorer::ScoredCandidate;

/// Scores at or above this are decisive and skip the random pick
const STRONG_SCORE_CUTOFF: f64 = 4.0;

/// Relative weights for ranks 1..=3 of a weak field
const RANK_WEIGHTS: [u32; 3] = [70, 20, 10];

/// Policy for picking one expression from a ranked candidate list
#[derive(Debug, Clone, Copy)]
pub struct VarietyPolicy {
    strong_score_cutoff: f64,
}

impl Default for VarietyPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl VarietyPolicy {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strong_score_cutoff: STRONG_SCORE_CUTOFF,
        }
    }

    /// Pick one expression from a descending-ranked candidate list.
    ///
    /// Returns `None` only for an empty list. A lone candidate or a decisive
    /// top score is returned as-is; otherwise ranks one to three are drawn
    /// with 70/20/10 weights (renormalized when fewer than three exist).
    pub fn pick<R: Rng + ?Sized>(
        &self,
        candidates: &[ScoredCandidate],
        rng: &mut R,
    ) -> Option<Expression> {
        let top = candidates.first()?;
        if candidates.len() == 1 || top.score >= self.strong_score_cutoff {
            return Some(top.expression);
        }

        let pool = &candidates[..candidates.len().min(RANK_WEIGHTS.len())];
        let total: u32 = RANK_WEIGHTS[..pool.len()].iter().sum();
        let mut roll = rng.random_range(0..total);
        for (candidate, weight) in pool.iter().zip(RANK_WEIGHTS) {
            if roll < weight {
                return Some(candidate.expression);
            }
            roll -= weight;
        }
        Some(top.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn candidate(expression: Expression, score: f64) -> ScoredCandidate {
        ScoredCandidate {
            expression,
            score,
            reason_tags: vec![],
        }
    }

    #[test]
    fn empty_field_yields_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(VarietyPolicy::new().pick(&[], &mut rng), None);
    }

    #[test]
    fn decisive_top_always_wins() {
        let mut rng = StdRng::seed_from_u64(2);
        let candidates = vec![
            candidate(Expression::Rainy, 8.0),
            candidate(Expression::Sad, 3.0),
            candidate(Expression::Idle, 1.0),
        ];
        for _ in 0..200 {
            assert_eq!(
                VarietyPolicy::new().pick(&candidates, &mut rng),
                Some(Expression::Rainy)
            );
        }
    }

    #[test]
    fn lone_weak_candidate_wins() {
        let mut rng = StdRng::seed_from_u64(3);
        let candidates = vec![candidate(Expression::Hopeful, 0.5)];
        assert_eq!(
            VarietyPolicy::new().pick(&candidates, &mut rng),
            Some(Expression::Hopeful)
        );
    }

    #[test]
    fn weak_field_eventually_picks_every_rank() {
        let mut rng = StdRng::seed_from_u64(4);
        let candidates = vec![
            candidate(Expression::Thinking, 2.5),
            candidate(Expression::Confused, 2.0),
            candidate(Expression::Idle, 1.5),
        ];
        let policy = VarietyPolicy::new();
        let mut seen = [false; 3];
        for _ in 0..1_000 {
            match policy.pick(&candidates, &mut rng) {
                Some(Expression::Thinking) => seen[0] = true,
                Some(Expression::Confused) => seen[1] = true,
                Some(Expression::Idle) => seen[2] = true,
                other => panic!("unexpected pick {other:?}"),
            }
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn weak_field_favors_the_top_rank() {
        let mut rng = StdRng::seed_from_u64(5);
        let candidates = vec![
            candidate(Expression::Thinking, 2.5),
            candidate(Expression::Confused, 2.0),
        ];
        let policy = VarietyPolicy::new();
        let mut top_picks = 0;
        for _ in 0..1_000 {
            if policy.pick(&candidates, &mut rng) == Some(Expression::Thinking) {
                top_picks += 1;
            }
        }
        // 70/20 renormalized puts the top near 78%; allow a generous margin.
        assert!(top_picks > 600, "top picked only {top_picks} times");
    }
}
