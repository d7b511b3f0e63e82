use indexmap::IndexMap;

use super::domain::{AgentRecord, WeightConfig};

/// Min–max scaled attribute values, one sequence per weighted attribute,
/// each aligned with the agent sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedMetrics {
    columns: IndexMap<String, Vec<f64>>,
}

impl NormalizedMetrics {
    /// Normalizes every attribute named in `weights` across `agents`.
    ///
    /// Agents are expected to carry a numeric value for each weighted
    /// attribute; a missing value is treated as `0`.
    pub fn from_agents(agents: &[AgentRecord], weights: &WeightConfig) -> Self {
        let columns = weights
            .attributes()
            .map(|attribute| {
                let raw: Vec<f64> = agents
                    .iter()
                    .map(|agent| agent.attribute(attribute).unwrap_or(0.0))
                    .collect();
                (attribute.to_string(), normalize(&raw))
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, attribute: &str) -> Option<&[f64]> {
        self.columns.get(attribute).map(Vec::as_slice)
    }

    pub fn value(&self, attribute: &str, agent_index: usize) -> Option<f64> {
        self.columns
            .get(attribute)
            .and_then(|column| column.get(agent_index))
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(|(name, column)| (name.as_str(), column.as_slice()))
    }
}

/// Rescales `values` into `[0, 1]`. A constant sequence maps to all `1.0`.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    if span == 0.0 {
        return vec![1.0; values.len()];
    }

    values.iter().map(|value| (value - min) / span).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_attribute_normalizes_to_one() {
        assert_eq!(normalize(&[7.0, 7.0, 7.0]), vec![1.0, 1.0, 1.0]);
        assert_eq!(normalize(&[0.0]), vec![1.0]);
    }

    #[test]
    fn extremes_map_to_zero_and_one() {
        let scaled = normalize(&[10.0, 30.0, 20.0]);
        assert_eq!(scaled, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn negative_values_scale_into_unit_range() {
        let scaled = normalize(&[-4.0, 0.0, 4.0]);
        assert_eq!(scaled, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn metrics_follow_weight_order() {
        let agents = vec![
            AgentRecord::new("a").with_attribute("x", 1.0).with_attribute("y", 5.0),
            AgentRecord::new("b").with_attribute("x", 3.0).with_attribute("y", 5.0),
        ];
        let weights = WeightConfig::new().with("y", 0.5).with("x", 0.5);

        let metrics = NormalizedMetrics::from_agents(&agents, &weights);
        let names: Vec<&str> = metrics.iter().map(|(name, _)| name).collect();

        assert_eq!(names, vec!["y", "x"]);
        assert_eq!(metrics.column("x"), Some(&[0.0, 1.0][..]));
        assert_eq!(metrics.column("y"), Some(&[1.0, 1.0][..]));
        assert_eq!(metrics.value("x", 1), Some(1.0));
        assert_eq!(metrics.value("z", 0), None);
    }
}
