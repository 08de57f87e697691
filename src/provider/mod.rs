//! External cluster capabilities consumed by the checks.
//!
//! The checks never talk to a cluster directly; they consume the
//! [`AccessProvider`] and [`DiscoveryProvider`] traits. [`kube`] implements
//! both against the Kubernetes REST API; [`fake`] provides scriptable
//! doubles for tests.

pub mod fake;
pub mod kube;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised by provider adapters.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure talking to the cluster.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned status {status} for {path}")]
    Api { path: String, status: u16 },

    /// The response payload could not be decoded.
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The run was cancelled before or during the call.
    #[error("operation cancelled")]
    Cancelled,

    /// Adapter-specific unavailability; also used by test doubles.
    #[error("{message}")]
    Unavailable { message: String },
}

/// Cancellation context threaded through every external call.
///
/// Cloning shares the underlying flag. Between external calls the
/// evaluators check the flag and stop producing results once it is set;
/// results already emitted are retained by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    cancelled: Arc<AtomicBool>,
}

impl RunContext {
    /// A context that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every holder of this context.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// A permission rule granted to the caller.
///
/// The literal `"*"` on any axis matches everything on that axis.
/// `resource_names` and `non_resource_urls` are carried for completeness
/// but do not participate in requirement matching, mirroring the source
/// compatibility data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantedRule {
    pub api_groups: Vec<String>,
    pub resources: Vec<String>,
    pub verbs: Vec<String>,
    pub resource_names: Vec<String>,
    pub non_resource_urls: Vec<String>,
}

impl GrantedRule {
    /// Convenience constructor for resource rules.
    pub fn new(api_groups: &[&str], resources: &[&str], verbs: &[&str]) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            api_groups: owned(api_groups),
            resources: owned(resources),
            verbs: owned(verbs),
            resource_names: Vec::new(),
            non_resource_urls: Vec::new(),
        }
    }
}

/// Result of the bulk rule listing.
#[derive(Debug, Clone, Default)]
pub struct BulkRules {
    pub rules: Vec<GrantedRule>,
    /// The provider could not enumerate the full rule set. A partial
    /// listing must never be treated as complete.
    pub incomplete: bool,
}

/// One resource type exposed by the cluster.
#[derive(Debug, Clone)]
pub struct ApiResourceType {
    pub group: String,
    /// Full group/version string ("v1", "apps/v1").
    pub version: String,
    pub resource: String,
    pub verbs: Vec<String>,
}

/// Cluster version payload as served by `/version`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerVersion {
    pub major: String,
    pub minor: String,
    pub git_version: String,
    pub git_commit: String,
    pub git_tree_state: String,
    pub build_date: String,
    pub go_version: String,
    pub compiler: String,
    pub platform: String,
}

/// Queries what the caller is permitted to do in a scope.
pub trait AccessProvider {
    /// List all rules granted to the caller in `namespace`, in one call.
    fn list_granted_rules(
        &self,
        ctx: &RunContext,
        namespace: &str,
    ) -> std::result::Result<BulkRules, ProviderError>;

    /// Ask whether one verb is allowed on one group/resource pair.
    fn probe_verb(
        &self,
        ctx: &RunContext,
        namespace: &str,
        group: &str,
        resource: &str,
        verb: &str,
    ) -> std::result::Result<bool, ProviderError>;
}

/// Enumerates the resource types the cluster exposes.
pub trait DiscoveryProvider {
    /// List every (group, version, resource) tuple with its verbs.
    fn list_resource_types(
        &self,
        ctx: &RunContext,
    ) -> std::result::Result<Vec<ApiResourceType>, ProviderError>;

    /// Fetch the cluster's version payload.
    fn server_version(&self, ctx: &RunContext)
        -> std::result::Result<ServerVersion, ProviderError>;
}
