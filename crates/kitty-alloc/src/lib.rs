pub mod allocation;
pub mod config;
pub mod error;
pub mod report;
pub mod telemetry;
pub mod workflows;

pub use allocation::{
    allocate, AgentRecord, AllocationConfig, AllocationEntry, AllocationError, AllocationInput,
    AllocationResult, Bounds, Scorer, StrategyFault, StrategyKind, SummaryStats, ValidationError,
    WeightConfig,
};
