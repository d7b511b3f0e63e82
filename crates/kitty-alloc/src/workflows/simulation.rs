//! What-if simulation over a caller-owned copy of agents and weights.
//!
//! The session is an explicit state machine. Every edit sends it back to
//! [`SimulationState::Idle`], where a fresh allocation is computed from a
//! snapshot of the current agents and weights; the allocation pipeline
//! itself never sees the session.

use tracing::{debug, warn};

use crate::allocation::{
    allocate, AgentRecord, AllocationConfig, AllocationError, AllocationInput, AllocationResult,
    Scorer, WeightConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Idle,
    AwaitingChoice,
    EditingWeight,
    EditingAgent,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationChoice {
    ChangeWeight,
    EditAgent,
    Exit,
}

impl SimulationChoice {
    pub const fn ordered() -> [Self; 3] {
        [Self::ChangeWeight, Self::EditAgent, Self::Exit]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ChangeWeight => "Change weight",
            Self::EditAgent => "Edit agent value",
            Self::Exit => "Exit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightEdit {
    pub attribute: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentEdit {
    pub agent_index: usize,
    pub attribute: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("prompt failed: {0}")]
pub struct PromptError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditRejected {
    #[error("weight must be between 0 and 1 (got {0})")]
    WeightOutOfRange(f64),
    #[error("value must be a finite number (got {0})")]
    NotFinite(f64),
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),
    #[error("no agent at position {0}")]
    UnknownAgent(usize),
}

/// Terminal (or scripted) source of user decisions.
pub trait SimulationPrompter {
    fn choose(&mut self) -> Result<SimulationChoice, PromptError>;

    fn edit_weight(&mut self, weights: &WeightConfig) -> Result<WeightEdit, PromptError>;

    fn edit_agent(
        &mut self,
        agents: &[AgentRecord],
        weights: &WeightConfig,
    ) -> Result<AgentEdit, PromptError>;

    /// Called when an edit is rejected; the prompter is asked again.
    fn rejected(&mut self, _reason: &EditRejected) {}
}

/// Mutable what-if session. Owns its own copies of agents and weights.
#[derive(Debug, Clone)]
pub struct SimulationSession {
    kitty: u64,
    agents: Vec<AgentRecord>,
    config: AllocationConfig,
    state: SimulationState,
}

impl SimulationSession {
    pub fn new(input: &AllocationInput, config: &AllocationConfig) -> Self {
        Self {
            kitty: input.site_kitty,
            agents: input.sales_agents.clone(),
            config: config.clone(),
            state: SimulationState::Idle,
        }
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn agents(&self) -> &[AgentRecord] {
        &self.agents
    }

    pub fn weights(&self) -> &WeightConfig {
        &self.config.weights
    }

    /// Runs the pipeline on a snapshot of the current session values.
    pub fn evaluate(&self, scorer: Option<&dyn Scorer>) -> Result<AllocationResult, AllocationError> {
        let input = AllocationInput::new(self.kitty, self.agents.clone());
        allocate(&input, &self.config, scorer)
    }

    pub fn apply_weight(&mut self, edit: WeightEdit) -> Result<(), EditRejected> {
        if !(0.0..=1.0).contains(&edit.weight) {
            return Err(EditRejected::WeightOutOfRange(edit.weight));
        }
        if self.config.weights.get(&edit.attribute).is_none() {
            return Err(EditRejected::UnknownAttribute(edit.attribute));
        }
        self.config.weights.set(edit.attribute, edit.weight);
        Ok(())
    }

    pub fn apply_agent(&mut self, edit: AgentEdit) -> Result<(), EditRejected> {
        if !edit.value.is_finite() {
            return Err(EditRejected::NotFinite(edit.value));
        }
        if self.config.weights.get(&edit.attribute).is_none() {
            return Err(EditRejected::UnknownAttribute(edit.attribute));
        }
        let agent = self
            .agents
            .get_mut(edit.agent_index)
            .ok_or(EditRejected::UnknownAgent(edit.agent_index))?;
        agent.set_attribute(edit.attribute, edit.value);
        Ok(())
    }

    /// Performs one transition. In `Idle` the fresh result is passed to
    /// `on_result`; any allocation or prompt failure ends the session.
    pub fn step<P, F>(
        &mut self,
        prompter: &mut P,
        scorer: Option<&dyn Scorer>,
        on_result: &mut F,
    ) -> Result<SimulationState, SimulationError>
    where
        P: SimulationPrompter + ?Sized,
        F: FnMut(&AllocationResult),
    {
        let next = match self.state {
            SimulationState::Idle => {
                let result = match self.evaluate(scorer) {
                    Ok(result) => result,
                    Err(err) => {
                        self.state = SimulationState::Done;
                        return Err(err.into());
                    }
                };
                on_result(&result);
                SimulationState::AwaitingChoice
            }
            SimulationState::AwaitingChoice => match prompter.choose()? {
                SimulationChoice::ChangeWeight => SimulationState::EditingWeight,
                SimulationChoice::EditAgent => SimulationState::EditingAgent,
                SimulationChoice::Exit => SimulationState::Done,
            },
            SimulationState::EditingWeight => {
                let edit = prompter.edit_weight(&self.config.weights)?;
                match self.apply_weight(edit) {
                    Ok(()) => SimulationState::Idle,
                    Err(reason) => {
                        warn!(%reason, "weight edit rejected");
                        prompter.rejected(&reason);
                        SimulationState::EditingWeight
                    }
                }
            }
            SimulationState::EditingAgent => {
                let edit = prompter.edit_agent(&self.agents, &self.config.weights)?;
                match self.apply_agent(edit) {
                    Ok(()) => SimulationState::Idle,
                    Err(reason) => {
                        warn!(%reason, "agent edit rejected");
                        prompter.rejected(&reason);
                        SimulationState::EditingAgent
                    }
                }
            }
            SimulationState::Done => SimulationState::Done,
        };

        debug!(from = ?self.state, to = ?next, "simulation transition");
        self.state = next;
        Ok(next)
    }

    /// Drives the session until the user exits.
    pub fn run<P, F>(
        &mut self,
        prompter: &mut P,
        scorer: Option<&dyn Scorer>,
        mut on_result: F,
    ) -> Result<(), SimulationError>
    where
        P: SimulationPrompter + ?Sized,
        F: FnMut(&AllocationResult),
    {
        while self.step(prompter, scorer, &mut on_result)? != SimulationState::Done {}
        Ok(())
    }
}
