//! Blocking Kubernetes REST adapter.
//!
//! Implements both provider traits against the Kubernetes API using the
//! blocking HTTP client: `SelfSubjectRulesReview` for the bulk rule
//! listing, `SelfSubjectAccessReview` for per-verb probes, the aggregated
//! discovery endpoints for resource types, and `/version` for the server
//! version. Kubeconfig handling is out of scope; callers supply the API
//! server URL and a bearer token directly.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ClusterfitError, Result};
use crate::provider::{
    AccessProvider, ApiResourceType, BulkRules, DiscoveryProvider, GrantedRule, ProviderError,
    RunContext, ServerVersion,
};

const RULES_REVIEW_PATH: &str = "/apis/authorization.k8s.io/v1/selfsubjectrulesreviews";
const ACCESS_REVIEW_PATH: &str = "/apis/authorization.k8s.io/v1/selfsubjectaccessreviews";

/// Connection settings for the Kubernetes API.
#[derive(Debug, Clone)]
pub struct KubeApiConfig {
    /// Base URL of the API server (e.g. `https://10.0.0.1:6443`).
    pub base_url: String,
    /// Bearer token sent with every request, if any.
    pub bearer_token: Option<String>,
    /// Per-request deadline. Default: 15 seconds.
    pub timeout: Duration,
    /// Skip TLS certificate verification. Default: false.
    pub accept_invalid_certs: bool,
}

impl Default for KubeApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            bearer_token: None,
            timeout: Duration::from_secs(15),
            accept_invalid_certs: false,
        }
    }
}

/// Provider adapter talking to a Kubernetes API server.
#[derive(Debug)]
pub struct KubeApiProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl KubeApiProvider {
    /// Validate `config` and build the adapter.
    pub fn new(config: KubeApiConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(ClusterfitError::InvalidConfig {
                message: "api server base URL must not be empty".into(),
            });
        }
        if config.timeout.is_zero() {
            return Err(ClusterfitError::InvalidConfig {
                message: "request timeout must be non-zero".into(),
            });
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(ProviderError::from)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token,
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &RunContext,
        path: &str,
    ) -> std::result::Result<T, ProviderError> {
        if ctx.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let mut request = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        decode(path, request.send()?)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        ctx: &RunContext,
        path: &str,
        body: &B,
    ) -> std::result::Result<T, ProviderError> {
        if ctx.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let mut request = self.client.post(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        decode(path, request.json(body).send()?)
    }
}

fn decode<T: DeserializeOwned>(
    path: &str,
    response: reqwest::blocking::Response,
) -> std::result::Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Api {
            path: path.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text()?;
    serde_json::from_str(&body).map_err(|source| ProviderError::Decode {
        path: path.to_string(),
        source,
    })
}

// Wire payloads. Field names follow the Kubernetes API conventions.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RulesReviewRequest {
    api_version: &'static str,
    kind: &'static str,
    spec: RulesReviewSpec,
}

#[derive(Serialize)]
struct RulesReviewSpec {
    namespace: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RulesReviewResponse {
    status: RulesReviewStatus,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RulesReviewStatus {
    resource_rules: Vec<WireResourceRule>,
    non_resource_rules: Vec<WireNonResourceRule>,
    incomplete: bool,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireResourceRule {
    verbs: Vec<String>,
    api_groups: Vec<String>,
    resources: Vec<String>,
    resource_names: Vec<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireNonResourceRule {
    verbs: Vec<String>,
    #[serde(rename = "nonResourceURLs")]
    non_resource_urls: Vec<String>,
}

impl RulesReviewStatus {
    fn into_rules(self) -> Vec<GrantedRule> {
        let mut rules = Vec::with_capacity(self.resource_rules.len() + self.non_resource_rules.len());
        for rule in self.resource_rules {
            rules.push(GrantedRule {
                api_groups: rule.api_groups,
                resources: rule.resources,
                verbs: rule.verbs,
                resource_names: rule.resource_names,
                non_resource_urls: Vec::new(),
            });
        }
        for rule in self.non_resource_rules {
            rules.push(GrantedRule {
                api_groups: Vec::new(),
                resources: Vec::new(),
                verbs: rule.verbs,
                resource_names: Vec::new(),
                non_resource_urls: rule.non_resource_urls,
            });
        }
        rules
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessReviewRequest {
    api_version: &'static str,
    kind: &'static str,
    spec: AccessReviewSpec,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessReviewSpec {
    resource_attributes: ResourceAttributes,
}

#[derive(Serialize)]
struct ResourceAttributes {
    namespace: String,
    group: String,
    resource: String,
    verb: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct AccessReviewResponse {
    status: AccessReviewStatus,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct AccessReviewStatus {
    allowed: bool,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireResourceList {
    group_version: String,
    resources: Vec<WireApiResource>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireApiResource {
    name: String,
    verbs: Vec<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireGroupList {
    groups: Vec<WireApiGroup>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireApiGroup {
    name: String,
    preferred_version: Option<WireGroupVersion>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireGroupVersion {
    group_version: String,
}

fn split_group_version(group_version: &str) -> (String, String) {
    match group_version.split_once('/') {
        Some((group, _)) => (group.to_string(), group_version.to_string()),
        None => (String::new(), group_version.to_string()),
    }
}

fn collect_types(list: WireResourceList, out: &mut Vec<ApiResourceType>) {
    let (group, version) = split_group_version(&list.group_version);
    for resource in list.resources {
        out.push(ApiResourceType {
            group: group.clone(),
            version: version.clone(),
            resource: resource.name,
            verbs: resource.verbs,
        });
    }
}

impl AccessProvider for KubeApiProvider {
    fn list_granted_rules(
        &self,
        ctx: &RunContext,
        namespace: &str,
    ) -> std::result::Result<BulkRules, ProviderError> {
        let request = RulesReviewRequest {
            api_version: "authorization.k8s.io/v1",
            kind: "SelfSubjectRulesReview",
            spec: RulesReviewSpec {
                namespace: namespace.to_string(),
            },
        };

        let response: RulesReviewResponse = self.post_json(ctx, RULES_REVIEW_PATH, &request)?;
        let incomplete = response.status.incomplete;
        Ok(BulkRules {
            rules: response.status.into_rules(),
            incomplete,
        })
    }

    fn probe_verb(
        &self,
        ctx: &RunContext,
        namespace: &str,
        group: &str,
        resource: &str,
        verb: &str,
    ) -> std::result::Result<bool, ProviderError> {
        let request = AccessReviewRequest {
            api_version: "authorization.k8s.io/v1",
            kind: "SelfSubjectAccessReview",
            spec: AccessReviewSpec {
                resource_attributes: ResourceAttributes {
                    namespace: namespace.to_string(),
                    group: group.to_string(),
                    resource: resource.to_string(),
                    verb: verb.to_string(),
                },
            },
        };

        let response: AccessReviewResponse = self.post_json(ctx, ACCESS_REVIEW_PATH, &request)?;
        Ok(response.status.allowed)
    }
}

impl DiscoveryProvider for KubeApiProvider {
    fn list_resource_types(
        &self,
        ctx: &RunContext,
    ) -> std::result::Result<Vec<ApiResourceType>, ProviderError> {
        let mut types = Vec::new();

        let core: WireResourceList = self.get_json(ctx, "/api/v1")?;
        collect_types(core, &mut types);

        let groups: WireGroupList = self.get_json(ctx, "/apis")?;
        for group in groups.groups {
            let Some(preferred) = group.preferred_version else {
                tracing::debug!(group = %group.name, "api group has no preferred version");
                continue;
            };
            let list: WireResourceList =
                self.get_json(ctx, &format!("/apis/{}", preferred.group_version))?;
            collect_types(list, &mut types);
        }

        Ok(types)
    }

    fn server_version(
        &self,
        ctx: &RunContext,
    ) -> std::result::Result<ServerVersion, ProviderError> {
        self.get_json(ctx, "/version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn provider_for(server: &MockServer) -> KubeApiProvider {
        KubeApiProvider::new(KubeApiConfig {
            base_url: server.base_url(),
            ..KubeApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn rejects_empty_base_url() {
        let err = KubeApiProvider::new(KubeApiConfig::default()).unwrap_err();
        assert!(err.to_string().contains("base URL"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = KubeApiConfig {
            base_url: "https://example.invalid".into(),
            timeout: Duration::ZERO,
            ..KubeApiConfig::default()
        };
        assert!(KubeApiProvider::new(config).is_err());
    }

    #[test]
    fn bulk_listing_decodes_rules_and_incomplete_flag() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path(RULES_REVIEW_PATH);
            then.status(201).json_body(json!({
                "status": {
                    "resourceRules": [
                        {"verbs": ["get", "list"], "apiGroups": [""], "resources": ["pods"]},
                        {"verbs": ["*"], "apiGroups": ["apps"], "resources": ["*"]}
                    ],
                    "nonResourceRules": [
                        {"verbs": ["get"], "nonResourceURLs": ["/healthz"]}
                    ],
                    "incomplete": false
                }
            }));
        });

        let provider = provider_for(&server);
        let bulk = provider
            .list_granted_rules(&RunContext::new(), "default")
            .unwrap();
        mock.assert();

        assert!(!bulk.incomplete);
        assert_eq!(bulk.rules.len(), 3);
        assert_eq!(bulk.rules[0].resources, vec!["pods"]);
        assert_eq!(bulk.rules[2].non_resource_urls, vec!["/healthz"]);
    }

    #[test]
    fn bulk_listing_reports_incomplete() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(RULES_REVIEW_PATH);
            then.status(201)
                .json_body(json!({"status": {"incomplete": true}}));
        });

        let provider = provider_for(&server);
        let bulk = provider
            .list_granted_rules(&RunContext::new(), "default")
            .unwrap();
        assert!(bulk.incomplete);
        assert!(bulk.rules.is_empty());
    }

    #[test]
    fn probe_verb_reads_allowed_flag() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(ACCESS_REVIEW_PATH);
            then.status(201)
                .json_body(json!({"status": {"allowed": true}}));
        });

        let provider = provider_for(&server);
        let allowed = provider
            .probe_verb(&RunContext::new(), "default", "", "pods", "get")
            .unwrap();
        assert!(allowed);
    }

    #[test]
    fn non_success_status_is_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(ACCESS_REVIEW_PATH);
            then.status(403).json_body(json!({"message": "forbidden"}));
        });

        let provider = provider_for(&server);
        let err = provider
            .probe_verb(&RunContext::new(), "default", "", "pods", "get")
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 403, .. }));
    }

    #[test]
    fn malformed_payload_is_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/version");
            then.status(200).body("not json");
        });

        let provider = provider_for(&server);
        let err = provider.server_version(&RunContext::new()).unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    #[test]
    fn discovery_walks_core_and_group_endpoints() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1");
            then.status(200).json_body(json!({
                "groupVersion": "v1",
                "resources": [
                    {"name": "pods", "verbs": ["get", "list", "create"]},
                    {"name": "bindings", "verbs": []}
                ]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/apis");
            then.status(200).json_body(json!({
                "groups": [
                    {"name": "apps", "preferredVersion": {"groupVersion": "apps/v1"}}
                ]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/apis/apps/v1");
            then.status(200).json_body(json!({
                "groupVersion": "apps/v1",
                "resources": [{"name": "deployments", "verbs": ["get"]}]
            }));
        });

        let provider = provider_for(&server);
        let types = provider.list_resource_types(&RunContext::new()).unwrap();

        assert_eq!(types.len(), 3);
        let deployments = types.iter().find(|t| t.resource == "deployments").unwrap();
        assert_eq!(deployments.group, "apps");
        assert_eq!(deployments.version, "apps/v1");
    }

    #[test]
    fn cancelled_context_skips_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/version");
            then.status(200).json_body(json!({}));
        });

        let provider = provider_for(&server);
        let ctx = RunContext::new();
        ctx.cancel();
        let err = provider.server_version(&ctx).unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled));
        assert_eq!(mock.hits(), 0);
    }
}
