//! Scriptable provider doubles.
//!
//! Used by unit and integration tests to exercise the checks without a
//! cluster. Call counters are exposed so tests can assert on strategy
//! selection (one bulk call, N probe calls).

use std::cell::Cell;
use std::collections::HashSet;

use crate::provider::{
    AccessProvider, ApiResourceType, BulkRules, DiscoveryProvider, GrantedRule, ProviderError,
    RunContext, ServerVersion,
};

/// An [`AccessProvider`] backed by in-memory rules and probe answers.
#[derive(Debug, Default)]
pub struct FakeAccessProvider {
    rules: Vec<GrantedRule>,
    incomplete: bool,
    bulk_error: Option<String>,
    allowed: HashSet<(String, String, String)>,
    probe_errors: HashSet<String>,
    /// Number of bulk listing calls issued.
    pub bulk_calls: Cell<usize>,
    /// Number of per-verb probe calls issued.
    pub probe_calls: Cell<usize>,
}

impl FakeAccessProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these rules from the bulk listing.
    pub fn with_rules(mut self, rules: Vec<GrantedRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Mark the bulk listing as incomplete, forcing the probe fallback.
    pub fn with_incomplete(mut self) -> Self {
        self.incomplete = true;
        self
    }

    /// Fail the bulk listing with a transport-style error.
    pub fn with_bulk_error(mut self, message: &str) -> Self {
        self.bulk_error = Some(message.to_string());
        self
    }

    /// Answer `true` for this (group, resource, verb) probe.
    pub fn allow(mut self, group: &str, resource: &str, verb: &str) -> Self {
        self.allowed
            .insert((group.to_string(), resource.to_string(), verb.to_string()));
        self
    }

    /// Allow every verb in `verbs` on the given group/resource.
    pub fn allow_all(mut self, group: &str, resource: &str, verbs: &[&str]) -> Self {
        for verb in verbs {
            self = self.allow(group, resource, verb);
        }
        self
    }

    /// Fail any probe touching this resource.
    pub fn with_probe_error_for(mut self, resource: &str) -> Self {
        self.probe_errors.insert(resource.to_string());
        self
    }
}

impl AccessProvider for FakeAccessProvider {
    fn list_granted_rules(
        &self,
        ctx: &RunContext,
        _namespace: &str,
    ) -> Result<BulkRules, ProviderError> {
        if ctx.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        self.bulk_calls.set(self.bulk_calls.get() + 1);

        if let Some(message) = &self.bulk_error {
            return Err(ProviderError::Unavailable {
                message: message.clone(),
            });
        }

        Ok(BulkRules {
            rules: self.rules.clone(),
            incomplete: self.incomplete,
        })
    }

    fn probe_verb(
        &self,
        ctx: &RunContext,
        _namespace: &str,
        group: &str,
        resource: &str,
        verb: &str,
    ) -> Result<bool, ProviderError> {
        if ctx.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        self.probe_calls.set(self.probe_calls.get() + 1);

        if self.probe_errors.contains(resource) {
            return Err(ProviderError::Unavailable {
                message: format!("probe for {resource} unavailable"),
            });
        }

        Ok(self
            .allowed
            .contains(&(group.to_string(), resource.to_string(), verb.to_string())))
    }
}

/// A [`DiscoveryProvider`] backed by a fixed resource type list.
#[derive(Debug, Default)]
pub struct FakeDiscoveryProvider {
    types: Vec<ApiResourceType>,
    list_error: Option<String>,
    version: ServerVersion,
    version_error: Option<String>,
    /// Number of discovery listing calls issued.
    pub list_calls: Cell<usize>,
}

impl FakeDiscoveryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these resource types from discovery.
    pub fn with_types(mut self, types: Vec<ApiResourceType>) -> Self {
        self.types = types;
        self
    }

    /// Add one resource type.
    pub fn with_type(mut self, group: &str, version: &str, resource: &str, verbs: &[&str]) -> Self {
        self.types.push(ApiResourceType {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
            verbs: verbs.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    /// Fail the discovery listing.
    pub fn with_list_error(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_string());
        self
    }

    /// Serve this git version from `/version`.
    pub fn with_git_version(mut self, git_version: &str) -> Self {
        self.version = ServerVersion {
            git_version: git_version.to_string(),
            ..ServerVersion::default()
        };
        self
    }

    /// Fail the `/version` call.
    pub fn with_version_error(mut self, message: &str) -> Self {
        self.version_error = Some(message.to_string());
        self
    }
}

impl DiscoveryProvider for FakeDiscoveryProvider {
    fn list_resource_types(
        &self,
        ctx: &RunContext,
    ) -> Result<Vec<ApiResourceType>, ProviderError> {
        if ctx.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        self.list_calls.set(self.list_calls.get() + 1);

        if let Some(message) = &self.list_error {
            return Err(ProviderError::Unavailable {
                message: message.clone(),
            });
        }

        Ok(self.types.clone())
    }

    fn server_version(&self, ctx: &RunContext) -> Result<ServerVersion, ProviderError> {
        if ctx.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        if let Some(message) = &self.version_error {
            return Err(ProviderError::Unavailable {
                message: message.clone(),
            });
        }

        Ok(self.version.clone())
    }
}
