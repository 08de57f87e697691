//! Clusterfit - preflight compatibility checks for installing the
//! platform on Kubernetes.
//!
//! Clusterfit answers two questions before an install is attempted: does
//! the caller hold the RBAC permissions the target platform version
//! needs, and does the cluster expose the resource types that version
//! depends on?
//!
//! # Modules
//!
//! - [`checks`] - Version, RBAC, and resource availability checks
//! - [`cli`] - Command-line interface and wiring
//! - [`error`] - Error types and result aliases
//! - [`provider`] - Cluster capabilities (REST adapter and test doubles)
//! - [`report`] - Check results and the writer pipeline
//! - [`requirements`] - Versioned requirement catalog and resolver
//!
//! # Example
//!
//! ```
//! use clusterfit::checks::{CheckerConfig, ClusterChecker};
//! use clusterfit::provider::fake::{FakeAccessProvider, FakeDiscoveryProvider};
//! use clusterfit::provider::RunContext;
//! use clusterfit::report::CaptureWriter;
//!
//! let config = CheckerConfig::new("1.21", "default").unwrap();
//! let checker = ClusterChecker::new(
//!     config,
//!     FakeAccessProvider::new(),
//!     FakeDiscoveryProvider::new().with_git_version("v1.21.0"),
//! );
//!
//! let mut capture = CaptureWriter::new();
//! checker.run(&RunContext::new(), &mut capture).unwrap();
//! assert!(!capture.results().is_empty());
//! ```

pub mod checks;
pub mod cli;
pub mod error;
pub mod provider;
pub mod report;
pub mod requirements;

pub use error::{ClusterfitError, Result};
