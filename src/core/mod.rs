//! Core data structures for fatbin.
//!
//! This module contains the foundational types used throughout fatbin:
//! - Platform families, SDK platforms and architectures
//! - Dotted version strings
//! - Library and universal binary targets

pub mod platform;
pub mod target;
pub mod version;

pub use platform::{ApplePlatform, Architecture, PlatformType};
pub use target::{LibraryTarget, UniversalBinaryTarget};
pub use version::DottedVersion;
