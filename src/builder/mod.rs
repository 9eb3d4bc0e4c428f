//! Multi-architecture build planning.
//!
//! This module assembles per-architecture build variables and plans the
//! actions of a universal binary.

pub mod plan;
pub mod toolchain;
pub mod variables;

pub use plan::{Action, ActionGraph, ActionId, ActionKind, Artifact, MultiArchGraphBuilder};
pub use toolchain::{AppleToolchain, CommandSpec};
pub use variables::BuildVariableSet;
