//! Command-line interface parsing for the Indexa+ converter
//!
//! Handles the clap argument definitions and validates them into a
//! `StartupConfig` used by both the TUI and the one-shot conversion mode.

use chrono::NaiveDate;
use clap::Parser;
use thiserror::Error;

use crate::data::client::DEFAULT_BASE_URL;
use crate::data::UnitKind;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified unit name is not recognized
    #[error("Invalid unit: '{0}'. Valid units: ui, ur")]
    InvalidUnit(String),

    /// The specified date is not in YYYY-MM-DD format
    #[error("Invalid date: '{0}'. Expected format: YYYY-MM-DD")]
    InvalidDate(String),
}

/// Indexa+ - convert Uruguayan indexed and adjustable units to pesos
#[derive(Parser, Debug)]
#[command(name = "indexa")]
#[command(about = "Convert Unidades Indexadas (UI) and Reajustables (UR) to Uruguayan pesos")]
#[command(version)]
pub struct Cli {
    /// Unit to convert from: ui (indexada) or ur (reajustable)
    #[arg(long, value_name = "UNIT")]
    pub unit: Option<String>,

    /// Request the quotation for a specific date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// Convert this amount, print the result and exit without the TUI
    ///
    /// Examples:
    ///   indexa --amount 100            # 100 UI in pesos
    ///   indexa --amount 2.5 --unit ur  # 2.5 UR in pesos
    #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
    pub amount: Option<String>,

    /// Base URL of the quotation service
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Do not read or write the local quotation cache
    #[arg(long)]
    pub no_cache: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Initially selected unit
    pub unit: UnitKind,
    /// Date to request quotations for; `None` means the latest
    pub date: Option<NaiveDate>,
    /// Amount for one-shot mode
    pub amount: Option<String>,
    /// Service base URL
    pub base_url: String,
    /// Whether the local cache is used
    pub use_cache: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            unit: UnitKind::Indexed,
            date: None,
            amount: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            use_cache: true,
        }
    }
}

/// Parses a unit argument into a UnitKind.
pub fn parse_unit_arg(s: &str) -> Result<UnitKind, CliError> {
    UnitKind::from_str(s).ok_or_else(|| CliError::InvalidUnit(s.to_string()))
}

/// Parses a `YYYY-MM-DD` date argument.
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CliError::InvalidDate(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the unit or date is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let unit = match &cli.unit {
            Some(unit) => parse_unit_arg(unit)?,
            None => UnitKind::Indexed,
        };
        let date = cli.date.as_deref().map(parse_date_arg).transpose()?;

        Ok(StartupConfig {
            unit,
            date,
            amount: cli.amount.clone(),
            base_url: cli.base_url.clone(),
            use_cache: !cli.no_cache,
        })
    }

    /// Amount to convert once before exiting, when the TUI is skipped
    pub fn one_shot_amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }
}
