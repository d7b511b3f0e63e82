use crate::commands::{run_allocate, run_batch, run_simulation, AllocateArgs, BatchArgs, SimulateArgs};
use crate::infra::AllocationArgs;
use crate::server;
use clap::{Args, Parser, Subcommand};
use kitty_alloc::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Kitty Allocator",
    about = "Distribute a sales kitty across agents from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Allocate a single input file and print the chart, allocations and summary
    Allocate(AllocateArgs),
    /// Interactively change weights or agent values and watch the allocation update
    Simulate(SimulateArgs),
    /// Allocate every JSON scenario in a directory, auditing each success
    Batch(BatchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) allocation: AllocationArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Allocate(args) => run_allocate(args),
        Command::Simulate(args) => run_simulation(args),
        Command::Batch(args) => run_batch(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitty_alloc::StrategyKind;
    use std::path::PathBuf;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["kitty-alloc-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn allocate_accepts_strategy_and_outputs() {
        let cli = Cli::try_parse_from([
            "kitty-alloc-api",
            "allocate",
            "--input",
            "input.json",
            "--config",
            "config.json",
            "--strategy",
            "seniority-boost",
            "--csv",
            "out.csv",
            "--no-audit",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Allocate(args)) => {
                assert_eq!(args.input, PathBuf::from("input.json"));
                assert_eq!(args.allocation.config, Some(PathBuf::from("config.json")));
                assert_eq!(args.allocation.strategy, Some(StrategyKind::SeniorityBoost));
                assert_eq!(args.csv, Some(PathBuf::from("out.csv")));
                assert!(args.no_audit);
            }
            other => panic!("expected allocate command, got {other:?}"),
        }
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let err = Cli::try_parse_from([
            "kitty-alloc-api",
            "batch",
            "--dir",
            "scenarios",
            "--strategy",
            "lottery",
        ])
        .expect_err("strategy rejected");
        assert!(err.to_string().contains("lottery"));
    }
}
