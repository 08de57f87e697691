//! Versioned platform requirements.
//!
//! The catalog records, per platform version bracket, which Kubernetes
//! resource types must exist and which RBAC permissions the installing
//! user must hold. The resolver maps a concrete platform version onto
//! the matching bracket.

pub mod catalog;
pub mod resolver;

pub use catalog::{
    catalog, version_brackets, PermissionRequirement, PlatformVersionBracket,
    ResourceRequirement, VersionedRequirementSet,
};
pub use resolver::{nearest_version_bracket, parse_version, resolve_requirements};
