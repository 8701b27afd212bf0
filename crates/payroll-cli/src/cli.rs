//! Command-line arguments for `payroll-recon`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use payroll_cli::engine::{EngineSettings, ReferenceSource};
use payroll_cli::session::DEFAULT_MAX_UPLOAD_BYTES;
use payroll_model::FieldEdit;

#[derive(Parser)]
#[command(
    name = "payroll-recon",
    version,
    about = "Reconcile payroll uploads against a company's reference directory",
    long_about = "Reconcile payroll uploads against a company's reference directory.\n\n\
                  `process` turns an upload into a session file, `reconcile` re-checks a\n\
                  session after corrections, and `encode` writes the canonical payroll CSV\n\
                  once every row is valid."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow employee names and uploaded cells in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Integration catalog (TOML) replacing the built-in integrations.
    #[arg(
        long = "config",
        env = "PAYROLL_RECON_CONFIG",
        value_name = "PATH",
        global = true
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse an upload and run the first reconciliation pass.
    Process(ProcessArgs),

    /// Apply corrections to a session and reconcile it again.
    Reconcile(ReconcileArgs),

    /// Write the canonical payroll CSV for a fully valid session.
    Encode(EncodeArgs),

    /// List the configured integrations.
    Integrations,
}

#[derive(Args)]
pub struct ReferenceArgs {
    /// Read reference data from a JSON export.
    #[arg(long = "reference-file", value_name = "PATH", conflicts_with = "reference_url")]
    pub reference_file: Option<PathBuf>,

    /// Base URL of the reference directory service.
    #[arg(long = "reference-url", env = "PAYROLL_REFERENCE_URL", value_name = "URL")]
    pub reference_url: Option<String>,

    /// API key sent to the directory service.
    #[arg(
        long = "reference-api-key",
        env = "PAYROLL_REFERENCE_API_KEY",
        hide_env_values = true,
        value_name = "KEY"
    )]
    pub api_key: Option<String>,

    /// Give up on the reference fetch after this many seconds.
    #[arg(long = "fetch-timeout-secs", default_value_t = 30, value_name = "SECS")]
    pub fetch_timeout_secs: u64,
}

impl ReferenceArgs {
    pub fn source(&self) -> Result<ReferenceSource> {
        match (&self.reference_file, &self.reference_url) {
            (Some(path), _) => Ok(ReferenceSource::File(path.clone())),
            (None, Some(url)) => Ok(ReferenceSource::Http {
                base_url: url.clone(),
                api_key: self.api_key.clone(),
            }),
            (None, None) => bail!("no reference data: pass --reference-file or --reference-url"),
        }
    }

    pub fn settings(&self, catalog: Option<PathBuf>) -> Result<EngineSettings> {
        Ok(EngineSettings {
            catalog,
            reference: self.source()?,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
        })
    }
}

#[derive(Args)]
pub struct ProcessArgs {
    /// Uploaded CSV export.
    #[arg(value_name = "UPLOAD")]
    pub upload: PathBuf,

    /// Session file to write.
    #[arg(short = 'o', long = "session", value_name = "PATH")]
    pub session: PathBuf,

    #[arg(long = "company-id", value_name = "ID")]
    pub company_id: u64,

    #[arg(long = "integration-type", default_value = "payroll", value_name = "TYPE")]
    pub integration_type: String,

    #[arg(long = "provider", value_name = "PROVIDER")]
    pub provider: String,

    /// Refuse uploads larger than this.
    #[arg(long = "max-upload-bytes", default_value_t = DEFAULT_MAX_UPLOAD_BYTES, value_name = "BYTES")]
    pub max_upload_bytes: u64,

    #[command(flatten)]
    pub reference: ReferenceArgs,
}

#[derive(Args)]
pub struct ReconcileArgs {
    /// Session file written by `process` or a previous `reconcile`.
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,

    /// Set a lookup field or scalar, e.g. `--set 3:employee_id=1009`.
    /// Rows are numbered from 1.
    #[arg(long = "set", value_name = "ROW:FIELD=VALUE")]
    pub edits: Vec<FieldEdit>,

    /// Write the result here instead of overwriting SESSION.
    #[arg(short = 'o', long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub reference: ReferenceArgs,
}

#[derive(Args)]
pub struct EncodeArgs {
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,

    /// Output CSV path (stdout when omitted).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
