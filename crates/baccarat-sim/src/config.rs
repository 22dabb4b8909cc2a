use baccarat_core::model::bets::BetKind;
use baccarat_core::model::money::Money;
use baccarat_core::rules::TableRules;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// A round cannot consume more than six cards, so any cut-card threshold
/// of at least this many keeps the shoe from running dry mid-round.
const MIN_RESHUFFLE_THRESHOLD: usize = 6;

/// Root simulation configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimConfig {
    pub run_id: String,
    pub rounds: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Starting funds in dollars. Omitted means the original table's boot
    /// behavior: a random bankroll between $1,000 and $10,000.
    #[serde(default)]
    pub starting_bankroll: Option<f64>,
    #[serde(default)]
    pub table: TableRules,
    /// Wagers re-placed at the start of every round.
    pub bets: Vec<BetPlan>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SimConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;

        if self.rounds == 0 {
            return Err(ValidationError::InvalidField {
                field: "rounds".to_string(),
                message: "number of rounds must be greater than zero".to_string(),
            });
        }

        if let Some(bankroll) = self.starting_bankroll {
            if !bankroll.is_finite() || bankroll <= 0.0 {
                return Err(ValidationError::InvalidField {
                    field: "starting_bankroll".to_string(),
                    message: "starting bankroll must be a positive amount".to_string(),
                });
            }
        }

        self.validate_table()?;
        self.validate_bets()?;
        self.outputs.validate()?;
        self.logging.normalize();
        Ok(())
    }

    fn validate_table(&self) -> Result<(), ValidationError> {
        if self.table.decks == 0 {
            return Err(ValidationError::InvalidField {
                field: "table.decks".to_string(),
                message: "a shoe needs at least one deck".to_string(),
            });
        }
        if self.table.tie_odds <= 0 {
            return Err(ValidationError::InvalidField {
                field: "table.tie_odds".to_string(),
                message: "tie odds must be positive".to_string(),
            });
        }
        if !(0..=100).contains(&self.table.commission_percent) {
            return Err(ValidationError::InvalidField {
                field: "table.commission_percent".to_string(),
                message: "commission must be between 0 and 100 percent".to_string(),
            });
        }
        if self.table.reshuffle_threshold < MIN_RESHUFFLE_THRESHOLD {
            return Err(ValidationError::InvalidField {
                field: "table.reshuffle_threshold".to_string(),
                message: format!(
                    "threshold below {MIN_RESHUFFLE_THRESHOLD} can exhaust the shoe mid-round"
                ),
            });
        }
        Ok(())
    }

    fn validate_bets(&self) -> Result<(), ValidationError> {
        if self.bets.is_empty() {
            return Err(ValidationError::InvalidField {
                field: "bets".to_string(),
                message: "at least one wager is required".to_string(),
            });
        }

        for (index, bet) in self.bets.iter().enumerate() {
            if !bet.amount.is_finite() || bet.amount <= 0.0 {
                return Err(ValidationError::InvalidField {
                    field: format!("bets[{index}].amount"),
                    message: "bet amount must be a positive amount".to_string(),
                });
            }
        }

        let mut main_kinds: Vec<BetKind> = self
            .bets
            .iter()
            .map(|bet| bet.kind)
            .filter(|kind| kind.is_main())
            .collect();
        main_kinds.sort_by_key(|kind| kind.index());
        main_kinds.dedup();
        if main_kinds.len() > 1 {
            return Err(ValidationError::InvalidField {
                field: "bets".to_string(),
                message: "only one of Player/Banker/Tie may be staked per round".to_string(),
            });
        }

        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            plots_dir: resolve_template(&self.run_id, &self.outputs.plots_dir),
        }
    }
}

/// A single wager in the per-round plan.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BetPlan {
    pub kind: BetKind,
    /// Dollars; converted to cents when placed.
    pub amount: f64,
}

impl BetPlan {
    pub fn stake(&self) -> Money {
        Money::from_dollars(self.amount)
    }
}

/// Output artifact configuration; paths may contain `{run_id}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
    #[serde(default)]
    pub plots_dir: String,
}

impl OutputsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("outputs.jsonl", &self.jsonl), ("outputs.summary_md", &self.summary_md)] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: field.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: PathBuf,
}

/// Structured-logging block.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default)]
    pub level: Option<String>,
}

impl LoggingConfig {
    pub fn normalize(&mut self) {
        if let Some(level) = &mut self.level {
            *level = level.trim().to_ascii_lowercase();
        }
    }

    pub fn level(&self) -> Option<Level> {
        self.level.as_deref().and_then(|text| text.parse().ok())
    }
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }
    if let Some(bad) = run_id.chars().find(|c| !RUN_ID_ALLOWED.contains(*c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: format!("character '{bad}' is not allowed in run_id"),
        });
    }
    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration at {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
