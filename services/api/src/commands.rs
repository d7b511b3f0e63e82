use crate::infra::{prepare, AllocationArgs};
use crate::prompt::TerminalPrompter;
use clap::Args;
use kitty_alloc::error::AppError;
use kitty_alloc::report::{render_chart, write_csv};
use kitty_alloc::workflows::{
    load_input, AuditRecord, AuditSink, BatchOutcome, BatchRunner, FileAuditSink,
    SimulationSession,
};
use kitty_alloc::{allocate, AllocationConfig, AllocationInput, AllocationResult, SummaryStats};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Args, Debug)]
pub(crate) struct AllocateArgs {
    /// Input JSON with siteKitty and salesAgents
    #[arg(long)]
    pub(crate) input: PathBuf,
    #[command(flatten)]
    pub(crate) allocation: AllocationArgs,
    /// Also write the allocations to this CSV file
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Skip writing the audit log entry
    #[arg(long)]
    pub(crate) no_audit: bool,
    /// Directory for audit log entries (overrides AUDIT_DIR)
    #[arg(long)]
    pub(crate) audit_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Input JSON with siteKitty and salesAgents
    #[arg(long)]
    pub(crate) input: PathBuf,
    #[command(flatten)]
    pub(crate) allocation: AllocationArgs,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Directory of scenario JSON files
    #[arg(long)]
    pub(crate) dir: PathBuf,
    #[command(flatten)]
    pub(crate) allocation: AllocationArgs,
    /// Directory for audit log entries (overrides AUDIT_DIR)
    #[arg(long)]
    pub(crate) audit_dir: Option<PathBuf>,
}

pub(crate) fn run_allocate(args: AllocateArgs) -> Result<(), AppError> {
    let prepared = prepare(&args.allocation)?;
    let input = load_input(&args.input)?;
    let scorer = prepared.strategy.scorer();

    let result = allocate(&input, &prepared.allocation, Some(scorer.as_ref()))?;
    render_result(&result)?;

    if let Some(path) = args.csv.as_deref() {
        export_csv(path, &result)?;
        println!("\nCSV written to {}", path.display());
    }

    if !args.no_audit {
        let directory = args
            .audit_dir
            .unwrap_or_else(|| prepared.app.audit.directory.clone());
        let sink = FileAuditSink::new(directory);
        record_audit(&sink, &input, &prepared.allocation, &result);
    }

    Ok(())
}

pub(crate) fn run_simulation(args: SimulateArgs) -> Result<(), AppError> {
    let prepared = prepare(&args.allocation)?;
    let input = load_input(&args.input)?;
    let scorer = prepared.strategy.scorer();

    let mut session = SimulationSession::new(&input, &prepared.allocation);
    let mut prompter = TerminalPrompter;
    session.run(&mut prompter, Some(scorer.as_ref()), |result| {
        println!("{}", render_chart(&result.allocations));
        println!("{}", render_summary(&result.summary));
    })?;

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let prepared = prepare(&args.allocation)?;
    let scorer = prepared.strategy.scorer();
    let directory = args
        .audit_dir
        .unwrap_or_else(|| prepared.app.audit.directory.clone());
    let sink = FileAuditSink::new(directory);

    let report = BatchRunner::new(&prepared.allocation)
        .with_scorer(scorer.as_ref())
        .with_audit(&sink)
        .run(&args.dir)?;

    for outcome in &report.outcomes {
        match outcome {
            BatchOutcome::Completed { file, result, .. } => {
                println!("\n=== {file} ===");
                println!("{}", render_chart(&result.allocations));
                println!("{}", render_summary(&result.summary));
            }
            BatchOutcome::Failed { file, error } => {
                println!("\nError running {file}: {error}");
            }
        }
    }

    println!(
        "\nBatch complete: {} succeeded, {} failed",
        report.completed(),
        report.failed()
    );
    Ok(())
}

fn render_result(result: &AllocationResult) -> Result<(), AppError> {
    println!("{}", render_chart(&result.allocations));
    let allocations = serde_json::to_string_pretty(&result.allocations)?;
    println!("\nAllocations:\n{allocations}");
    println!("\n{}", render_summary(&result.summary));
    Ok(())
}

fn export_csv(path: &Path, result: &AllocationResult) -> Result<(), AppError> {
    let file = File::create(path)?;
    write_csv(file, result)?;
    Ok(())
}

fn record_audit(
    sink: &dyn AuditSink,
    input: &AllocationInput,
    config: &AllocationConfig,
    result: &AllocationResult,
) {
    let record = AuditRecord {
        input,
        config,
        result,
    };
    match sink.record(&record) {
        Ok(receipt) => println!("\nAudit log written to {}", receipt.location),
        Err(err) => warn!(error = %err, "audit log could not be written"),
    }
}

pub(crate) fn render_summary(summary: &SummaryStats) -> String {
    format!(
        "Summary\n  Total allocated: {}\n  Remaining kitty: {}\n  Mean: {:.2}\n  Median: {:.2}\n  Min: {}\n  Max: {}\n  Agents at min: {}\n  Agents at max: {}",
        summary.total_allocated,
        summary.remaining_kitty,
        summary.mean,
        summary.median,
        summary.min,
        summary.max,
        summary.agents_at_min,
        summary.agents_at_max,
    )
}
