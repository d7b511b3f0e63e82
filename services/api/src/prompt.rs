use dialoguer::{Input, Select};
use kitty_alloc::workflows::{
    AgentEdit, EditRejected, PromptError, SimulationChoice, SimulationPrompter, WeightEdit,
};
use kitty_alloc::{AgentRecord, WeightConfig};

/// Interactive prompts on the controlling terminal.
pub(crate) struct TerminalPrompter;

fn prompt_error(err: dialoguer::Error) -> PromptError {
    PromptError(err.to_string())
}

fn select_attribute(weights: &WeightConfig) -> Result<String, PromptError> {
    let attributes: Vec<&str> = weights.attributes().collect();
    let index = Select::new()
        .with_prompt("Attribute")
        .items(&attributes)
        .default(0)
        .interact()
        .map_err(prompt_error)?;
    Ok(attributes[index].to_string())
}

impl SimulationPrompter for TerminalPrompter {
    fn choose(&mut self) -> Result<SimulationChoice, PromptError> {
        let choices = SimulationChoice::ordered();
        let labels: Vec<&str> = choices.iter().map(|choice| choice.label()).collect();
        let index = Select::new()
            .with_prompt("Simulate: What to change?")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        Ok(choices[index])
    }

    fn edit_weight(&mut self, weights: &WeightConfig) -> Result<WeightEdit, PromptError> {
        let attribute = select_attribute(weights)?;
        let weight = Input::<f64>::new()
            .with_prompt("New weight (0-1)")
            .validate_with(|value: &f64| {
                if (0.0..=1.0).contains(value) {
                    Ok(())
                } else {
                    Err("weight must be between 0 and 1")
                }
            })
            .interact_text()
            .map_err(prompt_error)?;
        Ok(WeightEdit { attribute, weight })
    }

    fn edit_agent(
        &mut self,
        agents: &[AgentRecord],
        weights: &WeightConfig,
    ) -> Result<AgentEdit, PromptError> {
        let ids: Vec<&str> = agents.iter().map(|agent| agent.id.as_str()).collect();
        let agent_index = Select::new()
            .with_prompt("Agent")
            .items(&ids)
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        let attribute = select_attribute(weights)?;
        let value = Input::<f64>::new()
            .with_prompt("New value (number)")
            .validate_with(|value: &f64| {
                if value.is_finite() {
                    Ok(())
                } else {
                    Err("value must be a finite number")
                }
            })
            .interact_text()
            .map_err(prompt_error)?;
        Ok(AgentEdit {
            agent_index,
            attribute,
            value,
        })
    }

    fn rejected(&mut self, reason: &EditRejected) {
        eprintln!("{reason}");
    }
}
