use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use baccarat_core::game::engine::BaccaratTable;
use baccarat_core::game::events::EngineEvent;
use baccarat_core::game::{BetError, RoundError};
use baccarat_core::model::money::Money;
use baccarat_core::rules::Outcome;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::audit::{AuditCollector, AuditError, AuditReport, uniformity_check};
use crate::config::{ResolvedOutputs, SimConfig};
use crate::plot::render_bankroll_curve;

const UNIFORMITY_BUCKETS: u32 = 52;
const UNIFORMITY_DRAWS: usize = 52_000;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to encode round row: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("planned bet was rejected: {0}")]
    Bet(#[from] BetError),
    #[error("round sequencing failed: {0}")]
    Round(#[from] RoundError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

/// Drives a table through the configured number of rounds, standing in for
/// the presentation layer: it re-places the planned bets each round and
/// drains the engine's events into structured logs and JSONL rows.
pub struct SimRunner {
    config: SimConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub rounds_played: usize,
    pub stopped_early: bool,
    pub final_bankroll: Money,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub audit: AuditReport,
}

#[derive(Serialize)]
struct RoundRow {
    round: usize,
    outcome: Outcome,
    player_total: u8,
    banker_total: u8,
    staked_cents: i64,
    payout_cents: i64,
    net_cents: i64,
    bankroll_cents: i64,
}

impl SimRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: SimConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    /// Execute the simulation, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let bankroll = match self.config.starting_bankroll {
            Some(dollars) => Money::from_dollars(dollars),
            None => roll_boot_bankroll(self.config.seed),
        };

        let mut table = match self.config.seed {
            Some(seed) => BaccaratTable::with_seed(self.config.table.clone(), bankroll, seed),
            None => BaccaratTable::new(self.config.table.clone(), bankroll),
        };

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut audit = AuditCollector::new(bankroll);
        let mut curve: Vec<(usize, f64)> = vec![(0, bankroll.dollars())];
        let mut rounds_played = 0usize;
        let mut stopped_early = false;

        for event in table.drain_events() {
            trace_event(0, &event);
        }

        let plan_total = self
            .config
            .bets
            .iter()
            .fold(Money::ZERO, |sum, bet| sum + bet.stake());

        for round in 1..=self.config.rounds {
            if table.bankroll() < plan_total {
                stopped_early = true;
                event!(
                    Level::WARN,
                    round,
                    bankroll = %table.bankroll(),
                    "bankroll cannot cover the bet plan; stopping"
                );
                break;
            }

            for bet in &self.config.bets {
                table.place_bet(bet.kind, bet.stake())?;
            }
            let settlement = table.play_round()?;

            for event in table.drain_events() {
                trace_event(round, &event);
            }

            let staked = settlement.total_payout - settlement.net_profit;
            let row = RoundRow {
                round,
                outcome: settlement.outcome,
                player_total: settlement.player_total,
                banker_total: settlement.banker_total,
                staked_cents: staked.cents(),
                payout_cents: settlement.total_payout.cents(),
                net_cents: settlement.net_profit.cents(),
                bankroll_cents: table.bankroll().cents(),
            };
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;

            audit.record_round(&settlement);
            curve.push((round, table.bankroll().dollars()));
            rounds_played += 1;
        }

        writer.flush()?;

        let uniformity = uniformity_check(self.config.seed, UNIFORMITY_BUCKETS, UNIFORMITY_DRAWS);
        let report = audit.finalize(table.bankroll(), uniformity);
        report.write_markdown(&self.outputs.summary_md)?;

        let plot_path = if self.outputs.plots_dir.as_os_str().is_empty() {
            None
        } else {
            match render_bankroll_curve(&curve, &self.outputs.plots_dir) {
                Ok(path) => Some(path),
                Err(err) => {
                    eprintln!("WARN: {err}");
                    None
                }
            }
        };

        Ok(RunSummary {
            rounds_played,
            stopped_early,
            final_bankroll: table.bankroll(),
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
            audit: report,
        })
    }
}

/// The original table boots with a random bankroll between $1,000 and
/// $10,000; a configured seed keeps even that roll reproducible.
fn roll_boot_bankroll(seed: Option<u64>) -> Money {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Money::from_dollars_whole(rng.gen_range(1_000..=10_000))
}

fn ensure_parent(parent: Option<&Path>) -> Result<(), std::io::Error> {
    if let Some(parent) = parent {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn trace_event(round: usize, engine_event: &EngineEvent) {
    match engine_event {
        EngineEvent::ShoeCreated { remaining } => {
            event!(Level::INFO, round, remaining = *remaining, "fresh shoe");
        }
        EngineEvent::CardDealt { side, card, slot } => {
            event!(
                Level::DEBUG,
                round,
                side = %side,
                card = %card,
                slot = *slot,
                "card dealt"
            );
        }
        EngineEvent::ThirdCardDealt { side, card } => {
            event!(Level::DEBUG, round, side = %side, card = %card, "third card dealt");
        }
        EngineEvent::RoundSettled {
            settlement,
            bankroll,
        } => {
            event!(
                Level::INFO,
                round,
                outcome = %settlement.outcome,
                net = %settlement.net_profit,
                bankroll = %bankroll,
                "round settled"
            );
        }
        EngineEvent::BankrollChanged { bankroll } => {
            event!(Level::TRACE, round, bankroll = %bankroll, "bankroll changed");
        }
        EngineEvent::BetRejected { reason } => {
            event!(Level::WARN, round, reason = %reason, "bet rejected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SimRunner;
    use crate::config::SimConfig;
    use tempfile::tempdir;

    fn config_yaml(dir: &std::path::Path) -> String {
        format!(
            r#"
run_id: "runner_unit"
rounds: 40
seed: 99
starting_bankroll: 10000.0
bets:
  - kind: "player"
    amount: 25.0
  - kind: "player_pair"
    amount: 5.0
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
  plots_dir: ""
"#,
            jsonl = dir.join("rounds.jsonl").display(),
            summary = dir.join("summary.md").display(),
        )
    }

    #[test]
    fn run_reconciles_and_writes_rows() {
        let dir = tempdir().expect("temp dir");
        let mut config: SimConfig =
            serde_yaml::from_str(&config_yaml(dir.path())).expect("valid yaml");
        config.validate().expect("config validates");
        let outputs = config.resolved_outputs();

        let summary = SimRunner::new(config, outputs).run().expect("run completes");
        assert_eq!(summary.rounds_played, 40);
        assert!(!summary.stopped_early);
        assert!(summary.audit.drift_ok);
        assert!(summary.plot_path.is_none());

        let rows = std::fs::read_to_string(&summary.jsonl_path).unwrap();
        assert_eq!(rows.lines().count(), 40);
        assert!(std::fs::read_to_string(&summary.summary_path)
            .unwrap()
            .contains("Cent reconciliation: OK"));
    }

    #[test]
    fn run_stops_when_the_plan_outgrows_the_bankroll() {
        let dir = tempdir().expect("temp dir");
        let yaml = config_yaml(dir.path())
            .replace("starting_bankroll: 10000.0", "starting_bankroll: 60.0")
            .replace("rounds: 40", "rounds: 500");
        let mut config: SimConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
        config.validate().expect("config validates");
        let outputs = config.resolved_outputs();

        let summary = SimRunner::new(config, outputs).run().expect("run completes");
        assert!(summary.stopped_early);
        assert!(summary.rounds_played < 500);
        assert!(summary.audit.drift_ok);
    }
}
