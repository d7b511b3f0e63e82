//! Surfaces around the allocation pipeline: input loading, audit records,
//! batch scenario runs and the interactive what-if session.

pub mod audit;
pub mod batch;
pub mod input;
pub mod simulation;

pub use audit::{AuditError, AuditReceipt, AuditRecord, AuditSink, FileAuditSink};
pub use batch::{BatchError, BatchOutcome, BatchReport, BatchRunner, ScenarioError};
pub use input::{load_input, InputError};
pub use simulation::{
    AgentEdit, EditRejected, PromptError, SimulationChoice, SimulationError, SimulationPrompter,
    SimulationSession, SimulationState, WeightEdit,
};
