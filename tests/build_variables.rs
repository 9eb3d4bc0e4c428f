//! Toolchain variables seen by planned actions.
//!
//! Each test plans a target the way a user would, then walks the graph from
//! the universal binary back to the action under inspection.

use std::path::PathBuf;

use fatbin::builder::variables::{
    APPLE_SDK_PLATFORM_VALUE, APPLE_SDK_VERSION_OVERRIDE_VALUE, VERSION_MIN,
    XCODE_VERSION_OVERRIDE_VALUE,
};
use fatbin::builder::{ActionGraph, ActionKind};
use fatbin::core::{LibraryTarget, PlatformType};
use fatbin::ops::{plan_universal_binary, resolve_variables, PlanOptions};
use fatbin::{Config, LookupError};

fn watchos_options() -> PlanOptions {
    PlanOptions {
        name: "bin".to_string(),
        platform_type: Some(PlatformType::Watchos),
        cpus: vec!["armv7k".to_string()],
        xcode_version: Some("5.8".to_string()),
        minimum_os: vec![
            (PlatformType::Ios, "12.345".to_string()),
            (PlatformType::Watchos, "11.111".to_string()),
        ],
        srcs: vec![PathBuf::from("bin/main.cc")],
        deps: vec![LibraryTarget::new("a", ["a/a.cc"])],
        ..Default::default()
    }
}

fn plan(opts: &PlanOptions) -> ActionGraph {
    plan_universal_binary(&Config::default(), opts).unwrap()
}

#[test]
fn test_archive_in_watchos_slice_sees_watchos_versions() {
    let graph = plan(&watchos_options());

    let lipo = graph.generating_action(graph.universal_binary()).unwrap();
    assert_eq!(lipo.kind(), ActionKind::Combine);
    assert!(lipo.output().ends_with("bin_lipobin"));

    let bin = lipo.input_ending_with("_bin").unwrap();
    let link = graph.generating_action(bin).unwrap();
    assert_eq!(link.kind(), ActionKind::Link);

    let archive_out = link.input_ending_with("liba.a").unwrap();
    let archive = graph.generating_action(archive_out).unwrap();
    assert_eq!(archive.kind(), ActionKind::Archive);

    let id = archive.id();
    assert_eq!(graph.variable_value_for(id, XCODE_VERSION_OVERRIDE_VALUE).unwrap(), "5.8");
    assert_eq!(graph.variable_value_for(id, APPLE_SDK_VERSION_OVERRIDE_VALUE).unwrap(), "2.0");
    assert_eq!(graph.variable_value_for(id, APPLE_SDK_PLATFORM_VALUE).unwrap(), "WatchOS");
    assert_eq!(graph.variable_value_for(id, VERSION_MIN).unwrap(), "11.111");
}

#[test]
fn test_every_slice_action_shares_its_architecture_variables() {
    let mut opts = watchos_options();
    opts.cpus = vec!["armv7k".to_string(), "arm64_32".to_string(), "x86_64".to_string()];
    let graph = plan(&opts);

    for unit in graph.units() {
        for action in graph.actions() {
            if action.architecture() == Some(&unit.architecture) {
                assert_eq!(action.variables().unwrap().as_ref(), unit.variables.as_ref());
            }
        }
    }

    let platforms: Vec<&str> = graph
        .link_actions()
        .map(|a| a.variable(APPLE_SDK_PLATFORM_VALUE).unwrap())
        .collect();
    assert_eq!(platforms, vec!["WatchOS", "WatchOS", "WatchSimulator"]);
}

#[test]
fn test_combine_action_has_no_variables() {
    let graph = plan(&watchos_options());
    let combine = graph.combine_action();

    assert!(combine.variables().is_none());
    assert!(matches!(
        graph.variable_value_for(combine.id(), VERSION_MIN),
        Err(LookupError::NoVariables { .. })
    ));
    assert_eq!(
        combine.command().env,
        vec![("XCODE_VERSION_OVERRIDE".to_string(), "5.8".to_string())]
    );
}

#[test]
fn test_default_ios_variables() {
    let opts = PlanOptions {
        name: "bin".to_string(),
        cpu: Some("ios_x86_64".to_string()),
        ..Default::default()
    };
    let sets = resolve_variables(&Config::default(), &opts).unwrap();
    assert_eq!(sets.len(), 1);

    let vars = &sets[0];
    assert_eq!(vars.get(XCODE_VERSION_OVERRIDE_VALUE), Some("7.3.1"));
    assert_eq!(vars.get(APPLE_SDK_VERSION_OVERRIDE_VALUE), Some("8.4"));
    assert_eq!(vars.get(APPLE_SDK_PLATFORM_VALUE), Some("iPhoneSimulator"));
    assert_eq!(vars.get(VERSION_MIN), Some("8.4"));
}

#[test]
fn test_explicit_ios_variables() {
    let opts = PlanOptions {
        name: "bin".to_string(),
        cpu: Some("ios_x86_64".to_string()),
        xcode_version: Some("5.8".to_string()),
        minimum_os: vec![
            (PlatformType::Ios, "12.345".to_string()),
            (PlatformType::Watchos, "11.111".to_string()),
        ],
        ..Default::default()
    };
    let sets = resolve_variables(&Config::default(), &opts).unwrap();

    let vars = &sets[0];
    assert_eq!(vars.get(XCODE_VERSION_OVERRIDE_VALUE), Some("5.8"));
    assert_eq!(vars.get(APPLE_SDK_VERSION_OVERRIDE_VALUE), Some("8.4"));
    assert_eq!(vars.get(APPLE_SDK_PLATFORM_VALUE), Some("iPhoneSimulator"));
    assert_eq!(vars.get(VERSION_MIN), Some("12.345"));
}

#[test]
fn test_missing_variable_is_an_error() {
    let graph = plan(&watchos_options());
    let link = graph.link_actions().next().unwrap();
    let err = link.variable("no_such_variable").unwrap_err();
    assert!(matches!(err, LookupError::VariableNotFound { ref name, .. } if name == "no_such_variable"));
}
