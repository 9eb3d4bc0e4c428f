//! Toolchain configuration resolution.
//!
//! Turns a platform family, a CPU and the configured overrides into the
//! concrete versions and SDK names a compile or link invocation needs.
//! Everything here is pure: the same inputs always give the same result.

pub mod errors;
pub mod platform;
pub mod xcode;

pub use errors::{ConfigError, LookupError};
pub use platform::{resolve_platform_spec, PlatformSpec, VersionOverrides};
pub use xcode::{ToolchainVersion, XcodeResolver, XcodeVersionEntry, XcodeVersionTable};
