//! Version resolution against the requirement catalog.
//!
//! Resolution is first-match in the catalog's declared (descending)
//! order. If constraint ranges overlap, entry order decides; there is no
//! best-match search and no merging across entries.

use semver::Version;

use crate::error::{ClusterfitError, Result};
use crate::requirements::catalog::{
    catalog, version_brackets, PlatformVersionBracket, VersionedRequirementSet,
};

/// Parse a version string, tolerating the major.minor shorthand common
/// for platform and Kubernetes releases ("1.21", "v1.21.3-gke.100").
pub fn parse_version(input: &str) -> Result<Version> {
    let trimmed = input.trim().trim_start_matches('v');

    if let Ok(version) = Version::parse(trimmed) {
        return Ok(version);
    }

    // Pad a partial core version, leaving any pre-release/build suffix.
    let core_end = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(core_end);
    let padded = match core.matches('.').count() {
        0 => format!("{core}.0.0{suffix}"),
        1 => format!("{core}.0{suffix}"),
        _ => trimmed.to_string(),
    };

    Version::parse(&padded).map_err(|err| ClusterfitError::InvalidConfig {
        message: format!("invalid version {input:?}: {err}"),
    })
}

/// Select the requirement set for a platform version.
///
/// Returns the first catalog entry whose constraint matches. `None` is a
/// fatal precondition for dependent checks: callers must report a single
/// aggregate failure naming the version and run no further checks that
/// need requirements.
pub fn resolve_requirements(version: &Version) -> Option<&'static VersionedRequirementSet> {
    catalog().iter().find(|set| set.constraint.matches(version))
}

/// Select the nearest platform version bracket: the first bracket (in
/// descending order) whose platform version does not exceed `version`.
pub fn nearest_version_bracket(version: &Version) -> Option<&'static PlatformVersionBracket> {
    version_brackets()
        .iter()
        .find(|bracket| bracket.platform_version <= *version)
}
