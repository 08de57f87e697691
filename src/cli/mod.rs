//! Command-line interface and wiring.
//!
//! Thin layer over the check engine: argument parsing, provider and
//! pipeline assembly, and exit code mapping. Kubeconfig handling is
//! deliberately not implemented; the API server URL and bearer token are
//! passed directly.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::checks::{CheckerConfig, ClusterChecker};
use crate::error::{ClusterfitError, Result};
use crate::provider::kube::{KubeApiConfig, KubeApiProvider};
use crate::provider::RunContext;
use crate::report::{
    FilterWriter, HumanWriter, JsonWriter, OutputStyle, ResultWriter, SummaryWriter,
};

/// Clusterfit - Kubernetes compatibility preflight for the platform.
#[derive(Debug, Parser)]
#[command(name = "clusterfit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Only report failing checks
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that a Kubernetes cluster is compatible with a platform version
    Check(CheckArgs),
}

/// Output format for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per result
    Human,
    /// One JSON object per result
    Json,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CheckArgs {
    /// Platform version to validate against
    #[arg(long, default_value = "1.21")]
    pub platform_version: String,

    /// Kubernetes namespace the platform will be deployed into
    #[arg(short = 'n', long, default_value = "default")]
    pub namespace: String,

    /// Kubernetes API server base URL
    #[arg(long, env = "CLUSTERFIT_API_SERVER")]
    pub api_server: String,

    /// Bearer token for API server authentication
    #[arg(long, env = "CLUSTERFIT_TOKEN")]
    pub token: Option<String>,

    /// Read the bearer token from a file
    #[arg(long, conflicts_with = "token")]
    pub token_file: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure_skip_tls_verify: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 15)]
    pub timeout: u64,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,

    /// Use text state tags instead of glyphs
    #[arg(long)]
    pub ascii: bool,

    /// Include informational and skipped results
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    fn bearer_token(&self) -> Result<Option<String>> {
        if let Some(path) = &self.token_file {
            let token = std::fs::read_to_string(path)?;
            return Ok(Some(token.trim().to_string()));
        }
        Ok(self.token.clone())
    }
}

/// Run the `check` command. Returns the process exit code: 0 when no
/// check failed, 1 otherwise.
pub fn run_check(args: &CheckArgs, no_color: bool, quiet: bool) -> Result<u8> {
    let config = CheckerConfig::new(&args.platform_version, &args.namespace)?;

    if args.timeout == 0 {
        return Err(ClusterfitError::InvalidConfig {
            message: "timeout must be greater than zero".into(),
        });
    }

    let provider = KubeApiProvider::new(KubeApiConfig {
        base_url: args.api_server.clone(),
        bearer_token: args.bearer_token()?,
        timeout: Duration::from_secs(args.timeout),
        accept_invalid_certs: args.insecure_skip_tls_verify,
    })?;
    let discovery = KubeApiProvider::new(KubeApiConfig {
        base_url: args.api_server.clone(),
        bearer_token: args.bearer_token()?,
        timeout: Duration::from_secs(args.timeout),
        accept_invalid_certs: args.insecure_skip_tls_verify,
    })?;

    let checker = ClusterChecker::new(config, provider, discovery);

    let stdout = std::io::stdout();
    let render: Box<dyn ResultWriter> = match args.output {
        OutputFormat::Human => {
            let style = if args.ascii {
                OutputStyle::Text
            } else {
                OutputStyle::Glyph
            };
            Box::new(HumanWriter::new(stdout.lock()).style(style).colors(!no_color))
        }
        OutputFormat::Json => Box::new(JsonWriter::new(stdout.lock())),
    };

    let mut filter = FilterWriter::new(render);
    if args.verbose {
        filter.accept(crate::report::CheckState::Info);
        filter.accept(crate::report::CheckState::Skipped);
    }
    if quiet {
        filter.suppress(crate::report::CheckState::Passed);
        filter.suppress(crate::report::CheckState::Warning);
    }
    let mut writer = SummaryWriter::new(filter);

    let ctx = RunContext::new();
    checker.run(&ctx, &mut writer)?;

    let summary = writer.summary();
    tracing::debug!(?summary, "check run complete");
    if args.output == OutputFormat::Human && !quiet {
        println!(
            "{} checks: {} passed, {} warnings, {} failed",
            summary.total, summary.passed, summary.warning, summary.failed
        );
    }

    Ok(if summary.has_failures() { 1 } else { 0 })
}
