use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::validation::ValidationError;

/// One sales agent: an id plus the numeric attributes the weights refer to.
///
/// Attributes are stored as raw JSON values so that descriptive fields
/// (display names, regions) can travel with the record untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl AgentRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).and_then(Value::as_f64)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: f64) {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        self.attributes.insert(name.into(), value);
    }
}

/// The kitty and the ordered agent list for a single run.
///
/// Agent order matters: the reconciliation residual always lands on the
/// first agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct AllocationInput {
    pub site_kitty: u64,
    pub sales_agents: Vec<AgentRecord>,
}

impl AllocationInput {
    pub fn new(site_kitty: u64, sales_agents: Vec<AgentRecord>) -> Self {
        Self {
            site_kitty,
            sales_agents,
        }
    }

    /// Decodes an untyped JSON document, reporting the first structural
    /// problem as a [`ValidationError`].
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        let Value::Object(mut object) = value else {
            return Err(ValidationError::InputNotObject);
        };

        let site_kitty = match object.get("siteKitty") {
            None | Some(Value::Null) => return Err(ValidationError::MissingKitty),
            Some(Value::Number(number)) => number
                .as_f64()
                .ok_or(ValidationError::KittyNotNumeric)?,
            Some(_) => return Err(ValidationError::KittyNotNumeric),
        };
        let site_kitty = kitty_units(site_kitty)?;

        let agents = match object.remove("salesAgents") {
            None | Some(Value::Null) => return Err(ValidationError::MissingAgents),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(ValidationError::AgentsNotSequence),
        };
        if agents.is_empty() {
            return Err(ValidationError::NoAgents);
        }

        let sales_agents = agents
            .into_iter()
            .enumerate()
            .map(|(index, raw)| agent_from_value(index, raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            site_kitty,
            sales_agents,
        })
    }
}

impl TryFrom<Value> for AllocationInput {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// Largest kitty accepted; amounts are signed 64-bit.
pub const MAX_KITTY: u64 = i64::MAX as u64;

// 2^63, the first float above `MAX_KITTY`.
const KITTY_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn kitty_units(raw: f64) -> Result<u64, ValidationError> {
    if !raw.is_finite() {
        return Err(ValidationError::KittyNotNumeric);
    }
    if raw < 0.0 {
        return Err(ValidationError::NegativeKitty(raw));
    }
    if raw.fract() != 0.0 {
        return Err(ValidationError::FractionalKitty(raw));
    }
    if raw >= KITTY_LIMIT {
        return Err(ValidationError::KittyTooLarge(raw));
    }
    Ok(raw as u64)
}

fn agent_from_value(index: usize, raw: Value) -> Result<AgentRecord, ValidationError> {
    let Value::Object(mut attributes) = raw else {
        return Err(ValidationError::AgentNotObject { index });
    };
    let id = match attributes.remove("id") {
        Some(Value::String(id)) => id,
        Some(Value::Number(number)) => number.to_string(),
        _ => return Err(ValidationError::MissingAgentId { index }),
    };
    Ok(AgentRecord { id, attributes })
}

/// Attribute weights, kept in the order they were declared.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightConfig(IndexMap<String, f64>);

impl WeightConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attribute: impl Into<String>, weight: f64) -> Self {
        self.set(attribute, weight);
        self
    }

    pub fn set(&mut self, attribute: impl Into<String>, weight: f64) {
        self.0.insert(attribute.into(), weight);
    }

    pub fn get(&self, attribute: &str) -> Option<f64> {
        self.0.get(attribute).copied()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, weight)| (name.as_str(), *weight))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlays `other` key by key, appending attributes not yet present.
    pub fn merge(&mut self, other: WeightConfig) {
        for (attribute, weight) in other.0 {
            self.0.insert(attribute, weight);
        }
    }
}

impl FromIterator<(String, f64)> for WeightConfig {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Weights and optional per-agent bounds for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationConfig {
    #[serde(default = "default_weights")]
    pub weights: WeightConfig,
    #[serde(default)]
    pub min_per_agent: Option<f64>,
    #[serde(default)]
    pub max_per_agent: Option<f64>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            min_per_agent: None,
            max_per_agent: None,
        }
    }
}

impl AllocationConfig {
    pub fn with_weights(weights: WeightConfig) -> Self {
        Self {
            weights,
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_per_agent: self.min_per_agent.unwrap_or(0.0),
            max_per_agent: self.max_per_agent.unwrap_or(f64::INFINITY),
        }
    }
}

pub fn default_weights() -> WeightConfig {
    WeightConfig::new()
        .with("performanceScore", 0.4)
        .with("seniorityMonths", 0.2)
        .with("targetAchievedPercent", 0.3)
        .with("activeClients", 0.1)
}

/// Resolved per-agent bounds; unset values become `0` and `+inf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_per_agent: f64,
    pub max_per_agent: f64,
}

impl Bounds {
    /// Clamps `value` to the bounds, applying the upper bound first.
    pub fn clamp(&self, value: f64) -> f64 {
        value.min(self.max_per_agent).max(self.min_per_agent)
    }

    pub fn contains(&self, amount: i64) -> bool {
        let amount = amount as f64;
        amount >= self.min_per_agent && amount <= self.max_per_agent
    }
}

/// A single agent's share of the kitty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    pub id: String,
    pub assigned_amount: i64,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_allocated: i64,
    pub remaining_kitty: i64,
    pub mean: f64,
    pub median: f64,
    pub min: i64,
    pub max: i64,
    pub agents_at_min: usize,
    pub agents_at_max: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub allocations: Vec<AllocationEntry>,
    pub summary: SummaryStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_agents_with_sibling_attributes() {
        let input = AllocationInput::from_value(json!({
            "siteKitty": 1000,
            "salesAgents": [
                { "id": "A1", "performanceScore": 90, "region": "north" },
                { "id": "A2", "performanceScore": 70 }
            ]
        }))
        .expect("input decodes");

        assert_eq!(input.site_kitty, 1000);
        assert_eq!(input.sales_agents[0].id, "A1");
        assert_eq!(input.sales_agents[0].attribute("performanceScore"), Some(90.0));
        assert_eq!(input.sales_agents[0].attribute("region"), None);
        assert!(!input.sales_agents[1].attributes.contains_key("id"));
    }

    #[test]
    fn decoding_reports_first_structural_problem() {
        let missing = AllocationInput::from_value(json!({ "salesAgents": [] }));
        assert_eq!(missing, Err(ValidationError::MissingKitty));

        let not_array = AllocationInput::from_value(json!({
            "siteKitty": 10,
            "salesAgents": { "id": "A1" }
        }));
        assert_eq!(not_array, Err(ValidationError::AgentsNotSequence));

        let negative = AllocationInput::from_value(json!({
            "siteKitty": -5,
            "salesAgents": []
        }));
        assert_eq!(negative, Err(ValidationError::NegativeKitty(-5.0)));

        let empty = AllocationInput::from_value(json!({
            "siteKitty": 10,
            "salesAgents": []
        }));
        assert_eq!(empty, Err(ValidationError::NoAgents));
    }

    #[test]
    fn kitty_beyond_signed_range_is_rejected() {
        let agents = json!([{ "id": "a", "x": 1 }, { "id": "b", "x": 1 }]);

        let too_large = AllocationInput::from_value(json!({
            "siteKitty": 10_000_000_000_000_000_000_u64,
            "salesAgents": agents.clone()
        }));
        assert!(matches!(too_large, Err(ValidationError::KittyTooLarge(_))));

        let past_u64 = AllocationInput::from_value(json!({
            "siteKitty": 18_446_744_073_709_551_616.0,
            "salesAgents": agents.clone()
        }));
        assert_eq!(
            past_u64,
            Err(ValidationError::KittyTooLarge(18_446_744_073_709_551_616.0))
        );

        let largest = AllocationInput::from_value(json!({
            "siteKitty": 9_223_372_036_854_774_784_u64,
            "salesAgents": agents
        }))
        .expect("largest representable kitty decodes");
        assert!(largest.site_kitty <= MAX_KITTY);
    }

    #[test]
    fn fractional_kitty_is_rejected() {
        let result = AllocationInput::from_value(json!({
            "siteKitty": 10.5,
            "salesAgents": [{ "id": "A1" }]
        }));
        assert_eq!(result, Err(ValidationError::FractionalKitty(10.5)));
    }

    #[test]
    fn weights_keep_declaration_order() {
        let weights: WeightConfig =
            serde_json::from_str(r#"{"zeta": 0.1, "alpha": 0.5, "mid": 0.4}"#)
                .expect("weights parse");
        let order: Vec<&str> = weights.attributes().collect();
        assert_eq!(order, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn bounds_default_to_zero_and_unbounded() {
        let config: AllocationConfig =
            serde_json::from_str(r#"{"weights": {"a": 1}}"#).expect("config parses");
        let bounds = config.bounds();
        assert_eq!(bounds.min_per_agent, 0.0);
        assert!(bounds.max_per_agent.is_infinite());
    }

    #[test]
    fn clamp_applies_upper_bound_before_lower() {
        let bounds = Bounds {
            min_per_agent: 0.0,
            max_per_agent: -5.0,
        };
        assert_eq!(bounds.clamp(12.0), 0.0);
    }
}
