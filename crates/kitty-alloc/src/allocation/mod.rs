//! Kitty allocation pipeline.
//!
//! `allocate` validates the input, normalizes every weighted attribute,
//! scores agents with the native weighted sum or a caller-supplied
//! [`Scorer`], distributes the kitty with bound clamping and rounding
//! reconciliation, then attaches justifications and summary statistics.
//! The pipeline is pure: nothing is retained between calls.

mod distribution;
pub mod domain;
mod justification;
mod normalizer;
pub mod scoring;
mod summary;
mod validation;

pub use distribution::distribute;
pub use domain::{
    default_weights, AgentRecord, AllocationConfig, AllocationEntry, AllocationInput,
    AllocationResult, Bounds, SummaryStats, WeightConfig, MAX_KITTY,
};
pub use justification::{justify, EXCEPTIONAL_THRESHOLD};
pub use normalizer::{normalize, NormalizedMetrics};
pub use scoring::{
    FnScorer, ScoreVector, Scorer, SeniorityBoostScorer, StrategyFault, StrategyKind,
    UnknownStrategy, WeightedSumScorer,
};
pub use summary::summarize;
pub use validation::{validate, ValidationError};

/// Failure of a single allocation run. No partial result is ever produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Strategy(#[from] StrategyFault),
    #[error("clamped amounts cannot be reconciled to a kitty of {kitty} within 64-bit range")]
    AmountOverflow { kitty: u64 },
}

/// Runs the full pipeline. `scorer` defaults to [`WeightedSumScorer`].
pub fn allocate(
    input: &AllocationInput,
    config: &AllocationConfig,
    scorer: Option<&dyn Scorer>,
) -> Result<AllocationResult, AllocationError> {
    validate(input, config)?;

    let agents = &input.sales_agents;
    let weights = &config.weights;
    let normalized = NormalizedMetrics::from_agents(agents, weights);

    let scores = match scorer {
        Some(scorer) => scorer.score(agents, weights, &normalized)?,
        None => WeightedSumScorer.score(agents, weights, &normalized)?,
    };

    let amounts = distribute(input.site_kitty, agents, &scores, config.bounds())?;

    let allocations: Vec<AllocationEntry> = agents
        .iter()
        .zip(amounts)
        .enumerate()
        .map(|(index, (agent, assigned_amount))| AllocationEntry {
            id: agent.id.clone(),
            assigned_amount,
            justification: justify(&normalized, weights, index),
        })
        .collect();

    let summary = summarize(&allocations, input.site_kitty);

    Ok(AllocationResult {
        allocations,
        summary,
    })
}
