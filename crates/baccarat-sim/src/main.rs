use std::path::PathBuf;

use clap::Parser;

use baccarat_sim::config::{ResolvedOutputs, SimConfig};
use baccarat_sim::logging::init_logging;
use baccarat_sim::runner::SimRunner;

/// Punto banco table simulator and audit harness.
#[derive(Debug, Parser)]
#[command(
    name = "baccarat-sim",
    author,
    version,
    about = "Deterministic baccarat simulation harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "sim/sim.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of rounds to play.
    #[arg(long, value_name = "ROUNDS")]
    rounds: Option<usize>,

    /// Override the RNG seed for the shoe and bankroll roll.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the starting bankroll, in dollars.
    #[arg(long, value_name = "DOLLARS")]
    bankroll: Option<f64>,

    /// Exit after validating the configuration (no rounds are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SimConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(rounds) = cli.rounds {
        config.rounds = rounds;
    }

    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    if let Some(bankroll) = cli.bankroll {
        config.starting_bankroll = Some(bankroll);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let rounds = config.rounds;
    let bet_count = config.bets.len();

    println!(
        "Loaded configuration '{run_id}' with {bet_count} wager{} per round ({rounds} rounds)",
        if bet_count == 1 { "" } else { "s" }
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let summary = SimRunner::new(config, outputs).run()?;
    println!(
        "Run complete for '{run_id}': {} round{} played, final bankroll {} ({} rows at {})",
        summary.rounds_played,
        if summary.rounds_played == 1 { "" } else { "s" },
        summary.final_bankroll,
        summary.rounds_played,
        summary.jsonl_path.display()
    );
    if summary.stopped_early {
        println!("Stopped early: the bankroll could no longer cover the bet plan.");
    }
    println!("Audit summary: {}", summary.summary_path.display());
    println!(
        "Cent reconciliation: {}",
        if summary.audit.drift_ok { "OK" } else { "FAILED" }
    );
    println!(
        "RNG uniformity: chi-square {:.2}, p = {:.4} ({})",
        summary.audit.uniformity.statistic,
        summary.audit.uniformity.p_value,
        if summary.audit.uniformity.pass {
            "pass"
        } else {
            "FLAGGED"
        }
    );
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Bankroll plot: {}", plot_path.display());
    }

    Ok(())
}
