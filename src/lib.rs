//! fatbin - Apple toolchain variable resolution and universal binary planning
//!
//! This crate resolves the Xcode version, SDK version, SDK platform and
//! minimum OS for each requested architecture, and plans the compile,
//! archive, link and `lipo` actions that produce a multi-architecture
//! binary.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

pub use builder::plan::{ActionGraph, MultiArchGraphBuilder};
pub use builder::variables::BuildVariableSet;
pub use core::{Architecture, DottedVersion, PlatformType, UniversalBinaryTarget};
pub use resolver::{ConfigError, LookupError};
pub use util::config::Config;
