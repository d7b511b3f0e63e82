use clap::Args;
use kitty_alloc::config::AppConfig;
use kitty_alloc::error::AppError;
use kitty_alloc::telemetry;
use kitty_alloc::{AllocationConfig, StrategyKind};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Flags shared by every command that runs allocations.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct AllocationArgs {
    /// Allocation config JSON (weights, minPerAgent, maxPerAgent)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Scoring strategy: weighted_sum or seniority_boost
    #[arg(long, value_parser = parse_strategy)]
    pub(crate) strategy: Option<StrategyKind>,
}

pub(crate) fn parse_strategy(raw: &str) -> Result<StrategyKind, String> {
    raw.parse::<StrategyKind>().map_err(|err| err.to_string())
}

/// Application config, telemetry and the resolved allocation settings for one command.
pub(crate) struct Prepared {
    pub(crate) app: AppConfig,
    pub(crate) allocation: AllocationConfig,
    pub(crate) strategy: StrategyKind,
}

pub(crate) fn prepare(args: &AllocationArgs) -> Result<Prepared, AppError> {
    let app = AppConfig::load()?;
    telemetry::init(&app.telemetry)?;

    let strategy = args.strategy.unwrap_or(app.allocation.strategy);
    let allocation = app
        .allocation
        .load_allocation_config(args.config.as_deref())?;

    Ok(Prepared {
        app,
        allocation,
        strategy,
    })
}
