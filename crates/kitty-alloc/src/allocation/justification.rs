use super::domain::WeightConfig;
use super::normalizer::NormalizedMetrics;

/// Normalized values strictly above this mark are called out by name.
pub const EXCEPTIONAL_THRESHOLD: f64 = 0.8;

const BALANCED: &str = "Balanced contribution.";

/// Explains an agent's share by listing its exceptional attributes in weight
/// order.
pub fn justify(normalized: &NormalizedMetrics, weights: &WeightConfig, agent_index: usize) -> String {
    let exceptional: Vec<&str> = weights
        .attributes()
        .filter(|attribute| {
            normalized
                .value(attribute, agent_index)
                .is_some_and(|value| value > EXCEPTIONAL_THRESHOLD)
        })
        .collect();

    if exceptional.is_empty() {
        BALANCED.to_string()
    } else {
        format!("Exceptional: {}.", exceptional.join(", "))
    }
}
