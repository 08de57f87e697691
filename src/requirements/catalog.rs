//! The requirement catalog: a hand-maintained table of resource and RBAC
//! requirements per platform version bracket.
//!
//! The catalog is constructed once, is never mutated at runtime, and is
//! ordered from newest to oldest bracket. Resolution is first-match in
//! declared order (see [`crate::requirements::resolver`]).

use std::sync::OnceLock;

use semver::{Version, VersionReq};

/// Identifies a required API resource type.
///
/// `version` carries the full group/version string as served by discovery
/// ("v1" for the core group, "apps/v1" otherwise). Equality is structural;
/// the type is used as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRequirement {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl ResourceRequirement {
    /// Build a requirement for a resource type that must exist.
    pub fn new(group: &str, version: &str, resource: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        }
    }

    /// Group-qualified resource name for display ("apps/deployments",
    /// or just "pods" for the core group).
    pub fn qualified_name(&self) -> String {
        if self.group.is_empty() {
            self.resource.clone()
        } else {
            format!("{}/{}", self.group, self.resource)
        }
    }
}

/// A resource requirement plus the verbs the caller must hold on it.
#[derive(Debug, Clone)]
pub struct PermissionRequirement {
    pub resource: ResourceRequirement,
    /// Ordered list, semantically a set.
    pub verbs: Vec<String>,
}

/// Requirements for one platform version bracket.
#[derive(Debug)]
pub struct VersionedRequirementSet {
    /// Version constraint selecting this bracket.
    pub constraint: VersionReq,
    /// Resource types that must exist, with required verbs.
    pub resource_requirements: Vec<PermissionRequirement>,
    /// Permissions requested by the deployment role that do not
    /// necessarily correspond to resources existing in every cluster.
    /// Known asymmetry in the compatibility data; preserved as-is.
    pub role_only_requirements: Vec<PermissionRequirement>,
}

/// Supported Kubernetes server range for one platform version.
#[derive(Debug, Clone)]
pub struct PlatformVersionBracket {
    pub platform_version: Version,
    pub kubernetes_min: Version,
    pub kubernetes_max: Version,
}

pub const VERBS_ALL: &[&str] = &[
    "create",
    "delete",
    "deletecollection",
    "get",
    "list",
    "update",
    "patch",
    "watch",
];
pub const VERBS_GET_LIST_WATCH: &[&str] = &["get", "list", "watch"];
pub const VERBS_GET_CREATE: &[&str] = &["get", "create"];

fn perm(group: &str, version: &str, resource: &str, verbs: &[&str]) -> PermissionRequirement {
    PermissionRequirement {
        resource: ResourceRequirement::new(group, version, resource),
        verbs: verbs.iter().map(|v| v.to_string()).collect(),
    }
}

fn constraint(s: &str) -> VersionReq {
    // Catalog constraints are literals; a parse failure is a programming
    // error caught by the catalog tests.
    VersionReq::parse(s).unwrap_or_else(|err| panic!("parse constraint {s:?}: {err}"))
}

fn ver(s: &str) -> Version {
    crate::requirements::resolver::parse_version(s)
        .unwrap_or_else(|err| panic!("parse version {s:?}: {err}"))
}

/// All known resource and RBAC requirements, newest bracket first.
pub fn catalog() -> &'static [VersionedRequirementSet] {
    static CATALOG: OnceLock<Vec<VersionedRequirementSet>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        vec![VersionedRequirementSet {
            constraint: constraint(">=1.20"),
            resource_requirements: vec![
                perm("", "v1", "events", VERBS_ALL),
                perm("", "v1", "persistentvolumeclaims", VERBS_ALL),
                perm("", "v1", "pods", VERBS_ALL),
                perm("", "v1", "secrets", VERBS_ALL),
                perm("", "v1", "serviceaccounts", VERBS_ALL),
                perm("", "v1", "services", VERBS_ALL),
                perm("apps", "apps/v1", "deployments", VERBS_ALL),
                perm("apps", "apps/v1", "replicasets", VERBS_ALL),
                perm("apps", "apps/v1", "statefulsets", VERBS_ALL),
                perm(
                    "metrics.k8s.io",
                    "metrics.k8s.io/v1beta1",
                    "pods",
                    VERBS_GET_LIST_WATCH,
                ),
                perm(
                    "networking.k8s.io",
                    "networking.k8s.io/v1",
                    "ingresses",
                    VERBS_ALL,
                ),
                perm(
                    "networking.k8s.io",
                    "networking.k8s.io/v1",
                    "networkpolicies",
                    VERBS_ALL,
                ),
                perm(
                    "rbac.authorization.k8s.io",
                    "rbac.authorization.k8s.io/v1",
                    "roles",
                    VERBS_GET_CREATE,
                ),
                perm(
                    "rbac.authorization.k8s.io",
                    "rbac.authorization.k8s.io/v1",
                    "rolebindings",
                    VERBS_GET_CREATE,
                ),
                perm(
                    "storage.k8s.io",
                    "storage.k8s.io/v1",
                    "storageclasses",
                    VERBS_GET_LIST_WATCH,
                ),
            ],
            // Permissions requested by the default deployment role. The
            // role names several group/resource pairs that do not exist;
            // installation still requires them to be grantable.
            role_only_requirements: vec![
                perm("", "v1", "deployments", VERBS_ALL),
                perm("", "v1", "networkpolicies", VERBS_ALL),
                perm("", "v1", "pods/exec", VERBS_ALL),
                perm("", "v1", "pods/log", VERBS_ALL),
                perm("apps", "v1", "events", VERBS_ALL),
                perm("apps", "v1", "networkpolicies", VERBS_ALL),
                perm("apps", "v1", "persistentvolumeclaims", VERBS_ALL),
                perm("apps", "v1", "pods", VERBS_ALL),
                perm("apps", "v1", "pods/exec", VERBS_ALL),
                perm("apps", "v1", "pods/log", VERBS_ALL),
                perm("apps", "v1", "secrets", VERBS_ALL),
                perm("apps", "v1", "services", VERBS_ALL),
                perm("metrics.k8s.io", "v1beta1", "storageclasses", VERBS_GET_LIST_WATCH),
                perm("networking.k8s.io", "v1", "deployments", VERBS_ALL),
                perm("networking.k8s.io", "v1", "events", VERBS_ALL),
                perm("networking.k8s.io", "v1", "persistentvolumeclaims", VERBS_ALL),
                perm("networking.k8s.io", "v1", "pods", VERBS_ALL),
                perm("networking.k8s.io", "v1", "pods/exec", VERBS_ALL),
                perm("networking.k8s.io", "v1", "pods/log", VERBS_ALL),
                perm("networking.k8s.io", "v1", "secrets", VERBS_ALL),
                perm("networking.k8s.io", "v1", "services", VERBS_ALL),
                perm("storage.k8s.io", "v1", "pods", VERBS_GET_LIST_WATCH),
            ],
        }]
    })
}

/// Platform-to-Kubernetes support ranges, newest platform version first.
pub fn version_brackets() -> &'static [PlatformVersionBracket] {
    static BRACKETS: OnceLock<Vec<PlatformVersionBracket>> = OnceLock::new();
    BRACKETS.get_or_init(|| {
        vec![
            PlatformVersionBracket {
                platform_version: ver("1.21"),
                kubernetes_min: ver("1.19"),
                kubernetes_max: ver("1.22"),
            },
            PlatformVersionBracket {
                platform_version: ver("1.20"),
                kubernetes_min: ver("1.19"),
                kubernetes_max: ver("1.21"),
            },
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_nonempty_and_parses() {
        assert!(!catalog().is_empty());
    }

    #[test]
    fn catalog_requirements_have_verbs() {
        for set in catalog() {
            for req in set
                .resource_requirements
                .iter()
                .chain(&set.role_only_requirements)
            {
                assert!(
                    !req.verbs.is_empty(),
                    "requirement {} has no verbs",
                    req.resource.qualified_name()
                );
            }
        }
    }

    #[test]
    fn catalog_resource_requirements_are_unique() {
        for set in catalog() {
            let mut seen = std::collections::HashSet::new();
            for req in &set.resource_requirements {
                assert!(
                    seen.insert(req.resource.clone()),
                    "duplicate requirement {:?}",
                    req.resource
                );
            }
        }
    }

    #[test]
    fn version_brackets_are_ordered_descending() {
        let brackets = version_brackets();
        for pair in brackets.windows(2) {
            assert!(pair[0].platform_version > pair[1].platform_version);
        }
    }

    #[test]
    fn qualified_name_omits_core_group() {
        assert_eq!(ResourceRequirement::new("", "v1", "pods").qualified_name(), "pods");
        assert_eq!(
            ResourceRequirement::new("apps", "apps/v1", "deployments").qualified_name(),
            "apps/deployments"
        );
    }

    #[test]
    fn resource_requirement_equality_is_structural() {
        let a = ResourceRequirement::new("apps", "apps/v1", "deployments");
        let b = ResourceRequirement::new("apps", "apps/v1", "deployments");
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }
}
