use tracing::debug;

use super::domain::{AgentRecord, Bounds};
use super::scoring::StrategyFault;
use super::AllocationError;

/// Splits `kitty` across agents in proportion to `scores`.
///
/// Each raw share is clamped to `bounds` and rounded. Whatever the rounding
/// and clamping leave over (or overshoot) is added to the first agent, so the
/// returned amounts always sum to `kitty` even when that pushes the first
/// agent outside its bounds. Fails with [`AllocationError::AmountOverflow`]
/// when that first amount no longer fits an `i64`.
pub fn distribute(
    kitty: u64,
    agents: &[AgentRecord],
    scores: &[f64],
    bounds: Bounds,
) -> Result<Vec<i64>, AllocationError> {
    check_scores(agents, scores)?;
    if agents.is_empty() {
        return Ok(Vec::new());
    }

    let kitty_f = kitty as f64;
    let total_score: f64 = scores.iter().sum();
    let equal_share = kitty_f / agents.len() as f64;

    let mut amounts: Vec<i64> = scores
        .iter()
        .map(|score| {
            let raw_share = if total_score == 0.0 {
                equal_share
            } else {
                kitty_f * score / total_score
            };
            round_half_up(bounds.clamp(raw_share))
        })
        .collect();

    let allocated: i128 = amounts.iter().map(|amount| i128::from(*amount)).sum();
    let residual = i128::from(kitty) - allocated;
    if residual != 0 {
        amounts[0] = i64::try_from(i128::from(amounts[0]) + residual)
            .map_err(|_| AllocationError::AmountOverflow { kitty })?;
    }

    debug!(
        agents = agents.len(),
        total_score,
        %residual,
        "distributed kitty across agents"
    );

    Ok(amounts)
}

/// Rejects score vectors that cannot be paired with the agent sequence.
fn check_scores(agents: &[AgentRecord], scores: &[f64]) -> Result<(), StrategyFault> {
    if scores.len() != agents.len() {
        return Err(StrategyFault::LengthMismatch {
            expected: agents.len(),
            actual: scores.len(),
        });
    }
    if let Some((agent, value)) = agents
        .iter()
        .zip(scores)
        .find(|(_, score)| !score.is_finite())
    {
        return Err(StrategyFault::NonFiniteScore {
            agent: agent.id.clone(),
            value: *value,
        });
    }
    Ok(())
}

/// Rounds to the nearest integer, ties toward positive infinity.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agents(count: usize) -> Vec<AgentRecord> {
        (0..count)
            .map(|index| AgentRecord::new(format!("agent-{index}")))
            .collect()
    }

    fn unbounded() -> Bounds {
        Bounds {
            min_per_agent: 0.0,
            max_per_agent: f64::INFINITY,
        }
    }

    #[test]
    fn proportional_split_without_bounds() {
        let amounts = distribute(1000, &agents(3), &[2.0, 1.0, 1.0], unbounded())
            .expect("distribution succeeds");
        assert_eq!(amounts, vec![500, 250, 250]);
    }

    #[test]
    fn zero_total_score_splits_evenly() {
        let amounts =
            distribute(100, &agents(3), &[0.0, 0.0, 0.0], unbounded()).expect("even split");
        // 33.33 rounds to 33 for everyone; the leftover unit goes to the first agent.
        assert_eq!(amounts, vec![34, 33, 33]);
    }

    #[test]
    fn scores_cancelling_to_zero_use_even_split() {
        let amounts =
            distribute(90, &agents(3), &[1.0, -1.0, 0.0], unbounded()).expect("even split");
        assert_eq!(amounts, vec![30, 30, 30]);
    }

    #[test]
    fn clamped_low_share_is_lifted_to_minimum() {
        let bounds = Bounds {
            min_per_agent: 20.0,
            max_per_agent: 80.0,
        };
        let amounts =
            distribute(100, &agents(3), &[0.60, 0.35, 0.05], bounds).expect("distribution");

        assert_eq!(amounts[2], 20);
        assert_eq!(amounts[1], 35);
        assert_eq!(amounts.iter().sum::<i64>(), 100);
        assert_eq!(amounts[0], 45);
    }

    #[test]
    fn residual_may_push_first_agent_outside_bounds() {
        let bounds = Bounds {
            min_per_agent: 50.0,
            max_per_agent: 60.0,
        };
        let amounts = distribute(100, &agents(3), &[1.0, 1.0, 1.0], bounds).expect("distribution");

        assert_eq!(amounts, vec![0, 50, 50]);
        assert!(!bounds.contains(amounts[0]));
    }

    #[test]
    fn half_shares_round_up() {
        let amounts = distribute(5, &agents(2), &[1.0, 1.0], unbounded()).expect("distribution");
        // both 2.5 -> 3, residual -1 lands on the first agent
        assert_eq!(amounts, vec![2, 3]);
    }

    #[test]
    fn short_score_vector_is_a_strategy_fault() {
        let fault = distribute(100, &agents(3), &[1.0, 2.0], unbounded())
            .expect_err("length mismatch detected");
        assert_eq!(
            fault,
            AllocationError::Strategy(StrategyFault::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn non_finite_score_is_a_strategy_fault() {
        let fault = distribute(100, &agents(2), &[1.0, f64::NAN], unbounded())
            .expect_err("nan detected");
        assert!(matches!(
            fault,
            AllocationError::Strategy(StrategyFault::NonFiniteScore { ref agent, .. })
                if agent == "agent-1"
        ));
    }

    #[test]
    fn largest_kitty_reconciles_without_overflow() {
        let kitty = i64::MAX as u64;
        let amounts =
            distribute(kitty, &agents(2), &[1.0, 1.0], unbounded()).expect("distribution");

        let total: i128 = amounts.iter().map(|amount| i128::from(*amount)).sum();
        assert_eq!(total, i128::from(kitty));
    }

    #[test]
    fn unreconcilable_first_amount_is_an_error() {
        let bounds = Bounds {
            min_per_agent: 9.0e18,
            max_per_agent: f64::INFINITY,
        };
        let fault =
            distribute(0, &agents(3), &[1.0, 1.0, 1.0], bounds).expect_err("overflow detected");
        assert_eq!(fault, AllocationError::AmountOverflow { kitty: 0 });
    }
}
