//! RBAC permission checks.
//!
//! Evaluates the catalog's permission requirements against what the
//! caller is actually granted. Two strategies: a single bulk rule listing
//! matched locally (cheap), and a per-verb probe fallback for providers
//! that cannot enumerate the caller's rules completely (slow, one round
//! trip per required verb).

use std::collections::{BTreeMap, BTreeSet};

use crate::provider::{AccessProvider, DiscoveryProvider, GrantedRule, ProviderError, RunContext};
use crate::report::CheckResult;
use crate::requirements::{PermissionRequirement, VersionedRequirementSet};

use super::ClusterChecker;

const BULK_CHECK: &str = "kubernetes-rbac-rules";
const PROBE_CHECK: &str = "kubernetes-rbac-probe";

/// A granted rule reduced to a single matchable (group, resource) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormalizedRule {
    pub group: String,
    pub resource: String,
    pub verbs: BTreeSet<String>,
}

/// Expand compound rules into single-resource rules, merge duplicate
/// (group, resource) pairs, and order them deterministically so matching
/// is reproducible regardless of provider-returned order.
pub(crate) fn normalize_rules(rules: &[GrantedRule]) -> Vec<NormalizedRule> {
    let mut merged: BTreeMap<(String, String), BTreeSet<String>> = BTreeMap::new();

    for rule in rules {
        // Rules carrying only non-resource URLs cannot match a resource
        // requirement.
        if rule.resources.is_empty() {
            continue;
        }
        for group in &rule.api_groups {
            for resource in &rule.resources {
                merged
                    .entry((group.clone(), resource.clone()))
                    .or_default()
                    .extend(rule.verbs.iter().cloned());
            }
        }
    }

    merged
        .into_iter()
        .map(|((group, resource), verbs)| NormalizedRule {
            group,
            resource,
            verbs,
        })
        .collect()
}

/// Whether any rule satisfies the requirement on all three axes. `"*"`
/// matches unconditionally on its axis; the verb axis is a subset test.
/// One matching rule is sufficient.
pub(crate) fn satisfies(
    group: &str,
    resource: &str,
    verbs: &[String],
    rules: &[NormalizedRule],
) -> bool {
    rules.iter().any(|rule| {
        axis_matches(&rule.group, group)
            && axis_matches(&rule.resource, resource)
            && verbs_match(verbs, &rule.verbs)
    })
}

fn axis_matches(have: &str, want: &str) -> bool {
    have == "*" || have == want
}

fn verbs_match(want: &[String], have: &BTreeSet<String>) -> bool {
    if have.contains("*") {
        return true;
    }
    want.iter().all(|verb| have.contains(verb))
}

/// Strategy selected for a run of permission checks.
#[derive(Debug)]
pub(crate) enum RuleListing {
    /// A complete rule set was obtained; match locally.
    Bulk(Vec<NormalizedRule>),
    /// The listing was incomplete; probe each verb individually.
    Fallback,
}

pub(crate) fn select_strategy<A: AccessProvider>(
    access: &A,
    ctx: &RunContext,
    namespace: &str,
) -> Result<RuleListing, ProviderError> {
    let bulk = access.list_granted_rules(ctx, namespace)?;
    if bulk.incomplete {
        tracing::warn!("granted rule listing is incomplete, falling back to per-verb probes (slow)");
        return Ok(RuleListing::Fallback);
    }
    Ok(RuleListing::Bulk(normalize_rules(&bulk.rules)))
}

impl<A: AccessProvider, D: DiscoveryProvider> ClusterChecker<A, D> {
    /// Check every permission requirement, one result per requirement, in
    /// declared order (resource requirements, then role-only requirements).
    pub fn check_permissions(
        &self,
        ctx: &RunContext,
        requirements: &VersionedRequirementSet,
    ) -> Vec<CheckResult> {
        match select_strategy(&self.access, ctx, &self.config.namespace) {
            Ok(RuleListing::Bulk(rules)) => self.match_against_rules(&rules, requirements),
            Ok(RuleListing::Fallback) => self.probe_requirements(ctx, requirements),
            Err(err) => vec![CheckResult::fail_with_error(
                BULK_CHECK,
                "unable to list granted permissions",
                &err,
            )],
        }
    }

    fn match_against_rules(
        &self,
        rules: &[NormalizedRule],
        requirements: &VersionedRequirementSet,
    ) -> Vec<CheckResult> {
        for rule in rules {
            tracing::debug!(?rule, "normalized granted rule");
        }

        all_requirements(requirements)
            .map(|req| {
                let resource = &req.resource;
                if satisfies(&resource.group, &resource.resource, &req.verbs, rules) {
                    CheckResult::pass(
                        BULK_CHECK,
                        format!(
                            "resource {}: can {}",
                            resource.qualified_name(),
                            req.verbs.join(", ")
                        ),
                    )
                } else {
                    CheckResult::fail(
                        BULK_CHECK,
                        format!(
                            "resource {}: not satisfied: group:{:?} resource:{:?} verbs:{:?}",
                            resource.resource, resource.group, resource.resource, req.verbs
                        ),
                    )
                    .with_detail("group", resource.group.clone())
                    .with_detail("resource", resource.resource.clone())
                    .with_detail("verbs", req.verbs.join(","))
                }
            })
            .collect()
    }

    fn probe_requirements(
        &self,
        ctx: &RunContext,
        requirements: &VersionedRequirementSet,
    ) -> Vec<CheckResult> {
        let mut results = Vec::new();

        for req in all_requirements(requirements) {
            if ctx.is_cancelled() {
                break;
            }

            let resource = &req.resource;
            match self.probe_one(ctx, req) {
                Ok(allowed) if allowed.len() == req.verbs.len() => {
                    results.push(CheckResult::pass(
                        PROBE_CHECK,
                        format!(
                            "resource {}: can {}",
                            resource.qualified_name(),
                            req.verbs.join(", ")
                        ),
                    ));
                }
                Ok(allowed) => {
                    results.push(
                        CheckResult::fail(
                            PROBE_CHECK,
                            format!(
                                "missing permissions on resource {}: need {:?} have {:?}",
                                resource.resource, req.verbs, allowed
                            ),
                        )
                        .with_detail("group", resource.group.clone())
                        .with_detail("resource", resource.resource.clone()),
                    );
                }
                Err(err) => {
                    // Isolated failure: this requirement only.
                    results.push(CheckResult::fail_with_error(
                        PROBE_CHECK,
                        format!(
                            "unable to check permissions on resource {}",
                            resource.resource
                        ),
                        &err,
                    ));
                }
            }
        }

        results
    }

    /// Probe every required verb individually, returning the confirmed
    /// subset. A transport error short-circuits this requirement.
    fn probe_one(
        &self,
        ctx: &RunContext,
        req: &PermissionRequirement,
    ) -> Result<Vec<String>, ProviderError> {
        let mut allowed = Vec::with_capacity(req.verbs.len());

        for verb in &req.verbs {
            let granted = self.access.probe_verb(
                ctx,
                &self.config.namespace,
                &req.resource.group,
                &req.resource.resource,
                verb,
            )?;
            if granted {
                allowed.push(verb.clone());
            }
        }

        Ok(allowed)
    }
}

fn all_requirements(
    set: &VersionedRequirementSet,
) -> impl Iterator<Item = &PermissionRequirement> {
    set.resource_requirements
        .iter()
        .chain(set.role_only_requirements.iter())
}
