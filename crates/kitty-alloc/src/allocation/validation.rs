use std::collections::HashSet;

use super::domain::{AllocationConfig, AllocationInput, MAX_KITTY};

/// Structural problems detected before any computation takes place.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("input data missing or not a JSON object")]
    InputNotObject,
    #[error("siteKitty field missing")]
    MissingKitty,
    #[error("siteKitty must be a finite number")]
    KittyNotNumeric,
    #[error("siteKitty must not be negative (got {0})")]
    NegativeKitty(f64),
    #[error("siteKitty must be a whole number of units (got {0})")]
    FractionalKitty(f64),
    #[error("siteKitty exceeds the largest supported amount {max} (got {0})", max = MAX_KITTY)]
    KittyTooLarge(f64),
    #[error("salesAgents field missing")]
    MissingAgents,
    #[error("salesAgents must be an array")]
    AgentsNotSequence,
    #[error("no agents present")]
    NoAgents,
    #[error("salesAgents[{index}] must be an object")]
    AgentNotObject { index: usize },
    #[error("salesAgents[{index}] is missing a string id")]
    MissingAgentId { index: usize },
    #[error("{name} must be a finite number (got {value})")]
    NonFiniteBound { name: &'static str, value: f64 },
    #[error("minPerAgent ({min}) cannot exceed maxPerAgent ({max})")]
    InvertedBounds { min: f64, max: f64 },
    #[error("agent id '{0}' appears more than once")]
    DuplicateAgent(String),
    #[error("agent '{agent}' has no numeric value for weighted attribute '{attribute}'")]
    MissingAttribute { agent: String, attribute: String },
}

/// Checks the typed input and configuration, returning the first violation.
///
/// Order: kitty, agent list, bounds, then per-agent consistency against the
/// weighted attributes.
pub fn validate(input: &AllocationInput, config: &AllocationConfig) -> Result<(), ValidationError> {
    if input.site_kitty > MAX_KITTY {
        return Err(ValidationError::KittyTooLarge(input.site_kitty as f64));
    }
    if input.sales_agents.is_empty() {
        return Err(ValidationError::NoAgents);
    }

    validate_bounds(config)?;

    let mut seen = HashSet::with_capacity(input.sales_agents.len());
    for agent in &input.sales_agents {
        if !seen.insert(agent.id.as_str()) {
            return Err(ValidationError::DuplicateAgent(agent.id.clone()));
        }
    }

    for agent in &input.sales_agents {
        for attribute in config.weights.attributes() {
            match agent.attribute(attribute) {
                Some(value) if value.is_finite() => {}
                _ => {
                    return Err(ValidationError::MissingAttribute {
                        agent: agent.id.clone(),
                        attribute: attribute.to_string(),
                    })
                }
            }
        }
    }

    Ok(())
}

fn validate_bounds(config: &AllocationConfig) -> Result<(), ValidationError> {
    if let Some(min) = config.min_per_agent {
        if !min.is_finite() {
            return Err(ValidationError::NonFiniteBound {
                name: "minPerAgent",
                value: min,
            });
        }
    }
    if let Some(max) = config.max_per_agent {
        if max.is_nan() || max == f64::NEG_INFINITY {
            return Err(ValidationError::NonFiniteBound {
                name: "maxPerAgent",
                value: max,
            });
        }
    }
    if let (Some(min), Some(max)) = (config.min_per_agent, config.max_per_agent) {
        if min > max {
            return Err(ValidationError::InvertedBounds { min, max });
        }
    }
    Ok(())
}
