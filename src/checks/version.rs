//! Kubernetes server version compatibility check.

use crate::provider::{AccessProvider, DiscoveryProvider, RunContext};
use crate::report::CheckResult;
use crate::requirements::nearest_version_bracket;

use super::ClusterChecker;

const VERSION_CHECK: &str = "kubernetes-version";

impl<A: AccessProvider, D: DiscoveryProvider> ClusterChecker<A, D> {
    /// Check that the cluster's server version falls inside the range
    /// supported by the requested platform version.
    pub fn check_version(&self, ctx: &RunContext) -> CheckResult {
        let info = match self.discovery.server_version(ctx) {
            Ok(info) => info,
            Err(err) => {
                return CheckResult::fail_with_error(
                    VERSION_CHECK,
                    "failed to get version from server",
                    &err,
                );
            }
        };

        let Some(bracket) = nearest_version_bracket(&self.config.platform_version) else {
            return CheckResult::fail(
                VERSION_CHECK,
                format!(
                    "no known Kubernetes support range for platform version {}",
                    self.config.platform_version
                ),
            );
        };
        tracing::debug!(
            requested = %self.config.platform_version,
            selected = %bracket.platform_version,
            "selected platform version bracket"
        );

        let server = match crate::requirements::parse_version(&info.git_version) {
            Ok(version) => version,
            Err(err) => {
                return CheckResult::fail_with_error(
                    VERSION_CHECK,
                    "failed to parse server version",
                    &err,
                );
            }
        };

        let base = |summary: String| {
            CheckResult::fail(VERSION_CHECK, summary)
                .with_detail("platform-version", bracket.platform_version.to_string())
                .with_detail("major", info.major.clone())
                .with_detail("minor", info.minor.clone())
                .with_detail("git-version", info.git_version.clone())
                .with_detail("platform", info.platform.clone())
                .with_detail("build-date", info.build_date.clone())
                .with_detail("go-version", info.go_version.clone())
                .with_detail("compiler", info.compiler.clone())
        };

        if server < bracket.kubernetes_min || server > bracket.kubernetes_max {
            base(format!(
                "platform {} supports Kubernetes {} to {} and was not tested with {}",
                self.config.platform_version,
                bracket.kubernetes_min,
                bracket.kubernetes_max,
                server
            ))
        } else {
            let mut result = base(format!(
                "platform {} supports Kubernetes {} to {} (server version {})",
                self.config.platform_version,
                bracket.kubernetes_min,
                bracket.kubernetes_max,
                server
            ));
            result.state = crate::report::CheckState::Passed;
            result
        }
    }
}
