//! Interpreter environments and package-manager delegation
//!
//! This module provides:
//! - The host platform profile (executable names, script directory)
//! - Environment provisioning and subprocess execution
//! - Best-effort batch install/upgrade/uninstall with a failure log

pub mod batch;
pub mod environment;
pub mod platform;

pub use batch::{append_failure_log, collect_specs, parse_requirements, BatchAction, InstallationResult};
pub use environment::{EnvironmentGateway, EnvironmentHandle, Tool, ENVIRONMENT_MARKER};
pub use platform::Platform;
