use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{AgentRecord, WeightConfig};
use super::normalizer::NormalizedMetrics;

/// One raw score per agent, aligned by index.
pub type ScoreVector = Vec<f64>;

/// Failure raised by a scoring strategy or detected in its output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyFault {
    #[error("scoring strategy returned {actual} scores for {expected} agents")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("scoring strategy returned a non-finite score ({value}) for agent '{agent}'")]
    NonFiniteScore { agent: String, value: f64 },
    #[error("scoring strategy requires attribute '{0}'")]
    MissingAttribute(String),
    #[error("scoring strategy failed: {0}")]
    Failed(String),
}

/// Turns normalized attributes into one score per agent.
///
/// Implementations must return exactly one score per agent, in agent order.
/// Scores are only compared relative to each other, so negative values and
/// values above one are allowed.
pub trait Scorer: Send + Sync {
    fn score(
        &self,
        agents: &[AgentRecord],
        weights: &WeightConfig,
        normalized: &NormalizedMetrics,
    ) -> Result<ScoreVector, StrategyFault>;
}

/// Σ weight × normalized value, over the weighted attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedSumScorer;

impl Scorer for WeightedSumScorer {
    fn score(
        &self,
        agents: &[AgentRecord],
        weights: &WeightConfig,
        normalized: &NormalizedMetrics,
    ) -> Result<ScoreVector, StrategyFault> {
        Ok((0..agents.len())
            .map(|index| {
                weights
                    .iter()
                    .map(|(attribute, weight)| {
                        weight * normalized.value(attribute, index).unwrap_or(0.0)
                    })
                    .sum()
            })
            .collect())
    }
}

/// Adapts a caller-supplied function into a [`Scorer`].
pub struct FnScorer<F> {
    func: F,
}

impl<F> FnScorer<F>
where
    F: Fn(&[AgentRecord], &WeightConfig, &NormalizedMetrics) -> Result<ScoreVector, StrategyFault>
        + Send
        + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Scorer for FnScorer<F>
where
    F: Fn(&[AgentRecord], &WeightConfig, &NormalizedMetrics) -> Result<ScoreVector, StrategyFault>
        + Send
        + Sync,
{
    fn score(
        &self,
        agents: &[AgentRecord],
        weights: &WeightConfig,
        normalized: &NormalizedMetrics,
    ) -> Result<ScoreVector, StrategyFault> {
        (self.func)(agents, weights, normalized)
    }
}

impl<F> fmt::Debug for FnScorer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnScorer").finish_non_exhaustive()
    }
}

const PERFORMANCE: &str = "performanceScore";
const SENIORITY: &str = "seniorityMonths";
const TARGET: &str = "targetAchievedPercent";
const CLIENTS: &str = "activeClients";

/// Weighted sum over the four standard sales attributes with adjustments:
/// veterans (12+ months) count performance twice, agents above the average
/// client load earn a bonus and agents under 50% of target take a penalty.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeniorityBoostScorer;

impl SeniorityBoostScorer {
    const VETERAN_MONTHS: f64 = 12.0;
    const CLIENT_BONUS: f64 = 0.1;
    const TARGET_FLOOR: f64 = 50.0;
    const TARGET_PENALTY: f64 = 0.1;
}

impl Scorer for SeniorityBoostScorer {
    fn score(
        &self,
        agents: &[AgentRecord],
        weights: &WeightConfig,
        normalized: &NormalizedMetrics,
    ) -> Result<ScoreVector, StrategyFault> {
        let weight = |attribute: &str| {
            weights
                .get(attribute)
                .ok_or_else(|| StrategyFault::MissingAttribute(attribute.to_string()))
        };
        let column = |attribute: &str| {
            normalized
                .column(attribute)
                .ok_or_else(|| StrategyFault::MissingAttribute(attribute.to_string()))
        };
        let raw = |agent: &AgentRecord, attribute: &str| {
            agent
                .attribute(attribute)
                .ok_or_else(|| StrategyFault::MissingAttribute(attribute.to_string()))
        };

        let performance = (weight(PERFORMANCE)?, column(PERFORMANCE)?);
        let seniority = (weight(SENIORITY)?, column(SENIORITY)?);
        let target = (weight(TARGET)?, column(TARGET)?);
        let clients = (weight(CLIENTS)?, column(CLIENTS)?);

        let mut client_total = 0.0;
        for agent in agents {
            client_total += raw(agent, CLIENTS)?;
        }
        let average_clients = client_total / agents.len().max(1) as f64;

        agents
            .iter()
            .enumerate()
            .map(|(index, agent)| {
                let performance_factor = if raw(agent, SENIORITY)? >= Self::VETERAN_MONTHS {
                    2.0
                } else {
                    1.0
                };

                let mut score = performance_factor * performance.0 * performance.1[index];
                score += seniority.0 * seniority.1[index];
                score += target.0 * target.1[index];
                score += clients.0 * clients.1[index];

                if raw(agent, CLIENTS)? > average_clients {
                    score += Self::CLIENT_BONUS;
                }
                if raw(agent, TARGET)? < Self::TARGET_FLOOR {
                    score -= Self::TARGET_PENALTY;
                }
                Ok(score)
            })
            .collect()
    }
}

/// Scoring strategies selectable from configuration or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    WeightedSum,
    SeniorityBoost,
}

impl StrategyKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::WeightedSum => "weighted_sum",
            Self::SeniorityBoost => "seniority_boost",
        }
    }

    pub fn scorer(self) -> Box<dyn Scorer> {
        match self {
            Self::WeightedSum => Box::new(WeightedSumScorer),
            Self::SeniorityBoost => Box::new(SeniorityBoostScorer),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scoring strategy '{0}' (expected weighted_sum or seniority_boost)")]
pub struct UnknownStrategy(pub String);

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "weighted_sum" | "native" => Ok(Self::WeightedSum),
            "seniority_boost" => Ok(Self::SeniorityBoost),
            _ => Err(UnknownStrategy(value.to_string())),
        }
    }
}
