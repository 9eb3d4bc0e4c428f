//! High-level operations.
//!
//! This module contains the implementation of fatbin commands.

pub mod plan;

pub use plan::{
    build_request, effective_overrides, plan_universal_binary, resolve_variables,
    select_architectures, PlanOptions,
};
