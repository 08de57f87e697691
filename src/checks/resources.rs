//! Resource type availability checks.
//!
//! Verifies that every resource type the platform depends on is served
//! by the cluster, using a single discovery listing.

use std::collections::HashSet;

use crate::provider::{AccessProvider, DiscoveryProvider, RunContext};
use crate::report::CheckResult;
use crate::requirements::{ResourceRequirement, VersionedRequirementSet};

use super::ClusterChecker;

const RESOURCES_CHECK: &str = "kubernetes-resources";

impl<A: AccessProvider, D: DiscoveryProvider> ClusterChecker<A, D> {
    /// Check that each required resource type exists, one result per
    /// requirement in declared order. If the discovery listing itself
    /// fails there is no per-requirement information, so a single
    /// Skipped result covers the whole check.
    pub fn check_resources(
        &self,
        ctx: &RunContext,
        requirements: &VersionedRequirementSet,
    ) -> Vec<CheckResult> {
        let types = match self.discovery.list_resource_types(ctx) {
            Ok(types) => types,
            Err(err) => {
                return vec![CheckResult::skip(
                    RESOURCES_CHECK,
                    format!("unable to fetch api resources from server: {err}"),
                )];
            }
        };

        // A resource type exposing no verbs is unusable and counts as
        // absent.
        let available: HashSet<ResourceRequirement> = types
            .iter()
            .filter(|t| !t.verbs.is_empty())
            .map(|t| ResourceRequirement::new(&t.group, &t.version, &t.resource))
            .collect();

        requirements
            .resource_requirements
            .iter()
            .map(|req| {
                let resource = &req.resource;
                if available.contains(resource) {
                    CheckResult::pass(
                        RESOURCES_CHECK,
                        format!(
                            "found required resource:{:?} group:{:?} version:{:?}",
                            resource.resource, resource.group, resource.version
                        ),
                    )
                } else {
                    CheckResult::fail(
                        RESOURCES_CHECK,
                        format!(
                            "missing required resource:{:?} group:{:?} version:{:?}",
                            resource.resource, resource.group, resource.version
                        ),
                    )
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckerConfig;
    use crate::provider::fake::{FakeAccessProvider, FakeDiscoveryProvider};
    use crate::report::CheckState;
    use crate::requirements::PermissionRequirement;
    use semver::VersionReq;

    fn requirement(group: &str, version: &str, resource: &str) -> PermissionRequirement {
        PermissionRequirement {
            resource: ResourceRequirement::new(group, version, resource),
            verbs: vec!["get".into()],
        }
    }

    fn requirement_set(reqs: Vec<PermissionRequirement>) -> VersionedRequirementSet {
        VersionedRequirementSet {
            constraint: VersionReq::parse(">=1.0").unwrap(),
            resource_requirements: reqs,
            role_only_requirements: Vec::new(),
        }
    }

    fn checker(
        discovery: FakeDiscoveryProvider,
    ) -> ClusterChecker<FakeAccessProvider, FakeDiscoveryProvider> {
        ClusterChecker::new(
            CheckerConfig::new("1.21", "default").unwrap(),
            FakeAccessProvider::new(),
            discovery,
        )
    }

    #[test]
    fn present_resource_passes() {
        let discovery = FakeDiscoveryProvider::new()
            .with_type("", "v1", "pods", &["get", "list"])
            .with_type("apps", "apps/v1", "deployments", &["get"]);
        let checker = checker(discovery);
        let set = requirement_set(vec![
            requirement("", "v1", "pods"),
            requirement("apps", "apps/v1", "deployments"),
        ]);

        let results = checker.check_resources(&RunContext::new(), &set);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.state == CheckState::Passed));
        assert_eq!(checker.discovery.list_calls.get(), 1);
    }

    #[test]
    fn missing_resource_fails_naming_the_triple() {
        let discovery = FakeDiscoveryProvider::new().with_type("", "v1", "pods", &["get"]);
        let checker = checker(discovery);
        let set = requirement_set(vec![requirement("metrics.k8s.io", "metrics.k8s.io/v1beta1", "pods")]);

        let results = checker.check_resources(&RunContext::new(), &set);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].state, CheckState::Failed);
        assert!(results[0].summary.contains("metrics.k8s.io"));
        assert!(results[0].summary.contains("pods"));
    }

    #[test]
    fn resource_with_no_verbs_counts_as_absent() {
        let discovery = FakeDiscoveryProvider::new().with_type("", "v1", "bindings", &[]);
        let checker = checker(discovery);
        let set = requirement_set(vec![requirement("", "v1", "bindings")]);

        let results = checker.check_resources(&RunContext::new(), &set);
        assert_eq!(results[0].state, CheckState::Failed);
    }

    #[test]
    fn discovery_failure_yields_single_skipped_result() {
        let discovery = FakeDiscoveryProvider::new().with_list_error("connection reset");
        let checker = checker(discovery);
        let set = requirement_set(vec![
            requirement("", "v1", "pods"),
            requirement("", "v1", "secrets"),
        ]);

        let results = checker.check_resources(&RunContext::new(), &set);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].state, CheckState::Skipped);
        assert!(results[0].summary.contains("connection reset"));
    }

    #[test]
    fn role_only_requirements_are_not_checked_for_existence() {
        let discovery = FakeDiscoveryProvider::new().with_type("", "v1", "pods", &["get"]);
        let checker = checker(discovery);
        let set = VersionedRequirementSet {
            constraint: VersionReq::parse(">=1.0").unwrap(),
            resource_requirements: vec![requirement("", "v1", "pods")],
            // Role-only entries name resources that may not exist anywhere.
            role_only_requirements: vec![requirement("apps", "v1", "events")],
        };

        let results = checker.check_resources(&RunContext::new(), &set);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].state, CheckState::Passed);
    }
}
