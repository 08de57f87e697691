//! Cluster compatibility checks.
//!
//! [`ClusterChecker`] runs the full suite against one cluster: server
//! version compatibility, RBAC permissions, and resource type
//! availability. Requirements are resolved once per run; every produced
//! result is pushed through the caller's [`ResultWriter`] in order, and a
//! writer error aborts the run.

pub mod rbac;
pub mod resources;
pub mod version;

use semver::Version;

use crate::error::{ClusterfitError, Result};
use crate::provider::{AccessProvider, DiscoveryProvider, RunContext};
use crate::report::{CheckResult, ResultWriter};
use crate::requirements::resolve_requirements;

const REQUIREMENTS_CHECK: &str = "platform-requirements";

/// Validated checker configuration.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Platform version being validated against the cluster.
    pub platform_version: Version,
    /// Namespace the platform will be deployed into.
    pub namespace: String,
}

impl CheckerConfig {
    /// Parse and validate configuration values.
    ///
    /// `platform_version` accepts major.minor shorthand. An empty
    /// `namespace` defaults to `"default"`.
    pub fn new(platform_version: &str, namespace: &str) -> Result<Self> {
        let platform_version = crate::requirements::parse_version(platform_version)?;
        let namespace = if namespace.is_empty() {
            "default".to_string()
        } else {
            namespace.to_string()
        };

        Ok(Self {
            platform_version,
            namespace,
        })
    }
}

/// Runs compatibility checks against one cluster via injected providers.
#[derive(Debug)]
pub struct ClusterChecker<A, D> {
    config: CheckerConfig,
    access: A,
    discovery: D,
}

impl<A: AccessProvider, D: DiscoveryProvider> ClusterChecker<A, D> {
    /// Create a checker from a validated configuration and providers.
    pub fn new(config: CheckerConfig, access: A, discovery: D) -> Self {
        Self {
            config,
            access,
            discovery,
        }
    }

    /// The configuration this checker was built with.
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// The access provider backing RBAC checks.
    pub fn access(&self) -> &A {
        &self.access
    }

    /// The discovery provider backing version and resource checks.
    pub fn discovery(&self) -> &D {
        &self.discovery
    }

    /// Run every check, pushing results through `writer` in order.
    ///
    /// An unresolvable platform version is a fatal precondition: it
    /// produces a single aggregate failure and no further checks run.
    /// A cancelled context stops evaluation between checks; results
    /// already written are retained by the pipeline.
    pub fn run<W: ResultWriter>(&self, ctx: &RunContext, writer: &mut W) -> Result<()> {
        let Some(requirements) = resolve_requirements(&self.config.platform_version) else {
            tracing::error!(
                version = %self.config.platform_version,
                "no requirement set in the catalog"
            );
            writer.write_result(&CheckResult::fail(
                REQUIREMENTS_CHECK,
                format!(
                    "no requirements known for platform version {}",
                    self.config.platform_version
                ),
            ))?;
            return Ok(());
        };

        writer.write_result(&self.check_version(ctx))?;

        if ctx.is_cancelled() {
            return Err(cancelled());
        }
        for result in self.check_permissions(ctx, requirements) {
            writer.write_result(&result)?;
        }

        if ctx.is_cancelled() {
            return Err(cancelled());
        }
        for result in self.check_resources(ctx, requirements) {
            writer.write_result(&result)?;
        }

        Ok(())
    }
}

fn cancelled() -> ClusterfitError {
    crate::provider::ProviderError::Cancelled.into()
}
